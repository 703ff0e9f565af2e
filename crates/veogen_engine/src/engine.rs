use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::probe::probe_image;
use crate::request::{GenerationRequest, RequestSettings};
use crate::transport::{ChannelEventSink, Generator, ReqwestGenerator};
use crate::{EngineEvent, JobId};

enum EngineCommand {
    Generate {
        job_id: JobId,
        token: String,
        request: GenerationRequest,
    },
    ProbeImage {
        job_id: JobId,
        url: String,
    },
}

/// Command/event bridge to the engine's background runtime.
///
/// One logical session per generation job; nothing is shared across sessions.
/// Dropping the handle abandons any in-flight session, which closes its
/// connection (the only cancellation primitive).
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: RequestSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let generator = Arc::new(ReqwestGenerator::new(settings.clone()));
        let settings = Arc::new(settings);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let generator = generator.clone();
                let settings = settings.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(generator.as_ref(), &settings, command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn generate(&self, job_id: JobId, token: impl Into<String>, request: GenerationRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Generate {
            job_id,
            token: token.into(),
            request,
        });
    }

    pub fn probe_image(&self, job_id: JobId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::ProbeImage {
            job_id,
            url: url.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    generator: &dyn Generator,
    settings: &RequestSettings,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Generate {
            job_id,
            token,
            request,
        } => {
            let sink = ChannelEventSink::new(event_tx.clone());
            let result = generator.generate(job_id, &token, &request, &sink).await;
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
        }
        EngineCommand::ProbeImage { job_id, url } => {
            let result = probe_image(settings, &url).await;
            let _ = event_tx.send(EngineEvent::ProbeCompleted { job_id, result });
        }
    }
}
