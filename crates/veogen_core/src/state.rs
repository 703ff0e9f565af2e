use std::collections::VecDeque;

use url::Url;

use crate::models;
use crate::view_model::AppViewModel;

pub type JobId = u64;

/// Raw frames kept for display, matching the engine's trailing-log bound.
pub const FRAME_LOG_CAPACITY: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Checking the first-frame image URL before requesting.
    Probing,
    Requesting,
    Streaming,
    Done,
    Failed,
}

/// Validated request inputs handed to the engine through an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub token: String,
    pub model: String,
    pub prompt: String,
    pub start_image_url: Option<String>,
    pub extra_instructions: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    RecognizedMedia,
    UnrecognizedLink,
    NoLink,
}

/// What one finished session produced, mapped from the engine's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub text: String,
    pub candidate: Option<String>,
    pub kind: ArtifactKind,
    /// The stream dropped before the sentinel; `text` is best-effort partial.
    pub interrupted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    token: String,
    model: String,
    prompt: String,
    image_url: String,
    extra: String,
    stream: bool,
    session: SessionState,
    active_job: Option<JobId>,
    next_job_id: JobId,
    pending_draft: Option<RequestDraft>,
    frames: VecDeque<String>,
    result: Option<SessionResult>,
    error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            model: models::DEFAULT_MODEL.to_string(),
            next_job_id: 1,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            model: self.model.clone(),
            stream: self.stream,
            frames: self.frames.iter().cloned().collect(),
            result: self.result.clone(),
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns the dirty flag and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.active_job
    }

    /// Validates the current inputs into a request draft.
    pub(crate) fn draft(&self) -> Result<RequestDraft, String> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err("API token is required".to_string());
        }

        let model = self.model.trim();
        if !models::is_known_model(model) {
            return Err(format!("unknown model {model:?}"));
        }

        let image_url = self.image_url.trim();
        if !image_url.is_empty() {
            let parsed = Url::parse(image_url)
                .map_err(|err| format!("first-frame image url is invalid: {err}"))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err("first-frame image url must be http or https".to_string());
            }
        }

        let extra = self.extra.trim();
        Ok(RequestDraft {
            token: token.to_string(),
            model: model.to_string(),
            prompt: self.prompt.trim().to_string(),
            start_image_url: (!image_url.is_empty()).then(|| image_url.to_string()),
            extra_instructions: (!extra.is_empty()).then(|| extra.to_string()),
            stream: self.stream,
        })
    }

    pub(crate) fn set_token(&mut self, token: String) {
        self.token = token;
    }

    pub(crate) fn set_model(&mut self, model: String) {
        self.model = model;
        self.mark_dirty();
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    pub(crate) fn set_image_url(&mut self, url: String) {
        self.image_url = url;
    }

    pub(crate) fn set_extra(&mut self, extra: String) {
        self.extra = extra;
    }

    pub(crate) fn set_stream(&mut self, stream: bool) {
        self.stream = stream;
        self.mark_dirty();
    }

    /// Starts a new session: allocates a job id and resets per-session data.
    pub(crate) fn begin_session(&mut self, state: SessionState) -> JobId {
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.active_job = Some(job_id);
        self.pending_draft = None;
        self.frames.clear();
        self.result = None;
        self.error = None;
        self.session = state;
        self.mark_dirty();
        job_id
    }

    /// Parks a draft while the image probe is in flight.
    pub(crate) fn set_pending_draft(&mut self, draft: RequestDraft) {
        self.pending_draft = Some(draft);
    }

    pub(crate) fn take_pending_draft(&mut self) -> Option<RequestDraft> {
        self.pending_draft.take()
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        self.session = session;
        self.mark_dirty();
    }

    pub(crate) fn push_frame(&mut self, frame: String) {
        if self.frames.len() == FRAME_LOG_CAPACITY {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        self.mark_dirty();
    }

    pub(crate) fn finish_session(&mut self, result: SessionResult) {
        self.result = Some(result);
        self.active_job = None;
        self.pending_draft = None;
        self.session = SessionState::Done;
        self.mark_dirty();
    }

    pub(crate) fn fail_session(&mut self, message: String) {
        self.error = Some(message);
        self.active_job = None;
        self.pending_draft = None;
        self.session = SessionState::Failed;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
