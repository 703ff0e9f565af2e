use bytes::Bytes;
use engine_logging::{engine_info, engine_warn};
use futures_util::{Stream, StreamExt};

use crate::request::{GenerationRequest, RequestSettings};
use crate::resolve::resolve_text;
use crate::stream::{LineOutcome, StreamDecoder};
use crate::{
    extract_content_value, EngineEvent, FailureKind, GenerationError, JobId, JobProgress,
    SessionOutcome, Stage,
};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Reassembles a byte-chunk stream into text lines.
///
/// Buffers partial lines across chunks, splits on `\n`, strips a trailing
/// `\r`, and flushes a final unterminated line when the stream ends.
pub struct LineReader<S> {
    stream: S,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl<S> LineReader<S>
where
    S: Stream<Item = Result<Bytes, GenerationError>> + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            exhausted: false,
        }
    }

    /// Next complete line, `None` at end of stream. A read failure is
    /// terminal for the reader.
    pub async fn next_line(&mut self) -> Result<Option<String>, GenerationError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&byte| byte == b'\n') {
                let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.exhausted {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.buffer);
                return Ok(Some(String::from_utf8_lossy(&rest).into_owned()));
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => return Err(err),
                None => self.exhausted = true,
            }
        }
    }
}

/// Decoded remains of one streaming session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    pub text: String,
    pub frames: Vec<String>,
    /// Set when the transport dropped before the sentinel; the text and
    /// frames above hold everything that arrived up to that point.
    pub interruption: Option<FailureKind>,
}

/// Drives the decoder over a line source until the sentinel, exhaustion, or a
/// transport failure, emitting a [`EngineEvent::StreamFrame`] per logged
/// frame.
pub async fn consume_stream<S>(
    job_id: JobId,
    reader: &mut LineReader<S>,
    mut decoder: StreamDecoder,
    sink: &dyn EventSink,
) -> StreamSession
where
    S: Stream<Item = Result<Bytes, GenerationError>> + Unpin,
{
    let mut interruption = None;
    loop {
        match reader.next_line().await {
            Ok(Some(line)) => match decoder.push_line(&line) {
                LineOutcome::Terminated => break,
                LineOutcome::Logged { frame } | LineOutcome::Fragment { frame, .. } => {
                    sink.emit(EngineEvent::StreamFrame { job_id, frame });
                }
                LineOutcome::Skipped => {}
            },
            Ok(None) => break,
            Err(err) => {
                engine_warn!("job {} stream dropped: {}", job_id, err);
                interruption = Some(err.kind);
                break;
            }
        }
    }

    let (text, frames) = decoder.finish();
    StreamSession {
        text,
        frames,
        interruption,
    }
}

#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        job_id: JobId,
        token: &str,
        request: &GenerationRequest,
        sink: &dyn EventSink,
    ) -> Result<SessionOutcome, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGenerator {
    settings: RequestSettings,
}

impl ReqwestGenerator {
    pub fn new(settings: RequestSettings) -> Self {
        Self { settings }
    }

    fn endpoint(&self) -> Result<reqwest::Url, GenerationError> {
        let joined = format!("{}{}", self.settings.api_host, self.settings.api_path);
        reqwest::Url::parse(&joined)
            .map_err(|err| GenerationError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn build_client(&self) -> Result<reqwest::Client, GenerationError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| GenerationError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Generator for ReqwestGenerator {
    async fn generate(
        &self,
        job_id: JobId,
        token: &str,
        request: &GenerationRequest,
        sink: &dyn EventSink,
    ) -> Result<SessionOutcome, GenerationError> {
        let endpoint = self.endpoint()?;
        let client = self.build_client()?;

        sink.emit(EngineEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Requesting,
            frames: None,
        }));

        let response = client
            .post(endpoint)
            .bearer_auth(token)
            .json(&request.payload())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::new(
                FailureKind::HttpStatus(status.as_u16()),
                body,
            ));
        }

        engine_info!(
            "job {} connected, model={} stream={}",
            job_id,
            request.model,
            request.stream
        );

        if request.stream {
            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Streaming,
                frames: Some(0),
            }));

            let byte_stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(map_reqwest_error));
            let mut reader = LineReader::new(byte_stream);
            let session = consume_stream(job_id, &mut reader, StreamDecoder::new(), sink).await;

            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Resolving,
                frames: Some(session.frames.len()),
            }));

            let resolution = resolve_text(&session.text);
            Ok(SessionOutcome {
                text: session.text,
                frames: session.frames,
                resolution,
                interruption: session.interruption,
            })
        } else {
            let body = response.bytes().await.map_err(map_reqwest_error)?;
            let value: serde_json::Value = serde_json::from_slice(&body)
                .map_err(|err| GenerationError::new(FailureKind::UpstreamDecode, err.to_string()))?;

            sink.emit(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Resolving,
                frames: None,
            }));

            let text = extract_content_value(&value).unwrap_or_default();
            let resolution = resolve_text(&text);
            Ok(SessionOutcome {
                text,
                frames: Vec::new(),
                resolution,
                interruption: None,
            })
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        return GenerationError::new(FailureKind::Timeout, err.to_string());
    }
    GenerationError::new(FailureKind::Network, err.to_string())
}
