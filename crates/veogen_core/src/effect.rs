#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Check that the first-frame image URL serves an image.
    ProbeImage {
        job_id: crate::JobId,
        url: String,
    },
    /// Issue the generation request and run the session to completion.
    StartGeneration {
        job_id: crate::JobId,
        draft: crate::RequestDraft,
    },
}
