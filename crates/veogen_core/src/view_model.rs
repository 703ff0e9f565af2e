use crate::{SessionResult, SessionState};

/// Snapshot of everything the frontend needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub session: SessionState,
    pub model: String,
    pub stream: bool,
    /// Trailing raw-frame log, oldest first, bounded.
    pub frames: Vec<String>,
    pub result: Option<SessionResult>,
    pub error: Option<String>,
    pub dirty: bool,
}
