//! Veogen core: pure state machine and view-model helpers.
mod effect;
mod models;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use models::{is_known_model, DEFAULT_MODEL, MODEL_OPTIONS};
pub use msg::Msg;
pub use state::{
    AppState, ArtifactKind, JobId, RequestDraft, SessionResult, SessionState, FRAME_LOG_CAPACITY,
};
pub use update::update;
pub use view_model::AppViewModel;
