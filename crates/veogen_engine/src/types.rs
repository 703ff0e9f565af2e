use std::fmt;

use crate::resolve::Resolution;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Requesting,
    Streaming,
    Resolving,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub job_id: JobId,
    pub stage: Stage,
    /// Frames logged so far, when the stage has a meaningful count.
    pub frames: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(JobProgress),
    /// One raw frame joined the trailing log; emitted as it arrives so the
    /// host can render the log without waiting for stream completion.
    StreamFrame { job_id: JobId, frame: String },
    ProbeCompleted {
        job_id: JobId,
        result: Result<(), GenerationError>,
    },
    JobCompleted {
        job_id: JobId,
        result: Result<SessionOutcome, GenerationError>,
    },
}

/// Final state of one generation session.
///
/// A mid-stream transport failure does not discard the session: whatever text
/// and frames arrived before the drop are kept here and the failure is carried
/// in `interruption`, so a best-effort result can still be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub text: String,
    pub frames: Vec<String>,
    pub resolution: Resolution,
    pub interruption: Option<FailureKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct GenerationError {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Non-streaming response body was not valid JSON.
    UpstreamDecode,
    /// First-frame probe got a non-image content type.
    NotAnImage { content_type: String },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::UpstreamDecode => write!(f, "response body is not valid json"),
            FailureKind::NotAnImage { content_type } => {
                write!(f, "not an image (content type {content_type:?})")
            }
        }
    }
}
