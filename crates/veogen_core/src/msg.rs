#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the API token input.
    TokenChanged(String),
    /// User edited the prompt text.
    PromptChanged(String),
    /// User edited the first-frame image URL.
    ImageUrlChanged(String),
    /// User edited the extra-instructions text.
    ExtraChanged(String),
    /// User picked a model from the options list.
    ModelSelected(String),
    /// User toggled streaming delivery.
    StreamToggled(bool),
    /// User asked to generate a video from the current inputs.
    GenerateClicked,
    /// Engine finished the first-frame image probe.
    ProbeFinished {
        job_id: crate::JobId,
        result: Result<(), String>,
    },
    /// One raw frame joined the trailing log.
    FrameArrived {
        job_id: crate::JobId,
        frame: String,
    },
    /// Engine completed the generation session.
    JobFinished {
        job_id: crate::JobId,
        result: Result<crate::SessionResult, String>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
