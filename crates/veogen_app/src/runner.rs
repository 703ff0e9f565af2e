use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use veogen_core::{ArtifactKind, Effect, Msg, SessionResult};
use veogen_engine::{
    Classification, EngineEvent, EngineHandle, GenerationRequest, RequestSettings, SessionOutcome,
};

/// Bridges core effects to engine commands and engine events back to
/// messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: RequestSettings) -> Self {
        Self {
            engine: EngineHandle::new(settings),
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ProbeImage { job_id, url } => {
                    engine_info!("ProbeImage job_id={} url={}", job_id, url);
                    self.engine.probe_image(job_id, url);
                }
                Effect::StartGeneration { job_id, draft } => {
                    engine_info!(
                        "StartGeneration job_id={} model={} stream={}",
                        job_id,
                        draft.model,
                        draft.stream
                    );
                    let request = GenerationRequest {
                        model: draft.model,
                        prompt: draft.prompt,
                        start_image_url: draft.start_image_url,
                        extra_instructions: draft.extra_instructions,
                        stream: draft.stream,
                    };
                    self.engine.generate(job_id, draft.token, request);
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event, mapped to a message.
    pub fn poll(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => {
            engine_info!(
                "job {} stage {:?} frames={:?}",
                progress.job_id,
                progress.stage,
                progress.frames
            );
            Msg::NoOp
        }
        EngineEvent::StreamFrame { job_id, frame } => Msg::FrameArrived { job_id, frame },
        EngineEvent::ProbeCompleted { job_id, result } => Msg::ProbeFinished {
            job_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::JobCompleted { job_id, result } => {
            if let Err(err) = &result {
                engine_warn!("job {} failed: {}", job_id, err);
            }
            Msg::JobFinished {
                job_id,
                result: result.map(map_outcome).map_err(|err| err.to_string()),
            }
        }
    }
}

fn map_outcome(outcome: SessionOutcome) -> SessionResult {
    SessionResult {
        text: outcome.text,
        candidate: outcome.resolution.candidate,
        kind: map_classification(outcome.resolution.classification),
        interrupted: outcome.interruption.is_some(),
    }
}

fn map_classification(classification: Classification) -> ArtifactKind {
    match classification {
        Classification::RecognizedMedia => ArtifactKind::RecognizedMedia,
        Classification::UnrecognizedLink => ArtifactKind::UnrecognizedLink,
        Classification::NoLink => ArtifactKind::NoLink,
    }
}
