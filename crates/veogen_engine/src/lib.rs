//! Veogen engine: session IO pipeline, from request to resolved artifact.
mod engine;
mod probe;
mod request;
mod resolve;
mod stream;
mod transport;
mod types;

pub use engine::EngineHandle;
pub use probe::probe_image;
pub use request::{GenerationRequest, RequestPayload, RequestSettings};
pub use resolve::{
    classify, extract_content_value, find_first_url, resolve_text, Classification, Resolution,
    MEDIA_EXTENSIONS,
};
pub use stream::{
    FragmentNormalizer, IdentityNormalizer, LatinReinterpret, LineOutcome, StreamDecoder,
    DEFAULT_TRAILING_CAPACITY, STREAM_SENTINEL,
};
pub use transport::{
    consume_stream, ChannelEventSink, EventSink, Generator, LineReader, ReqwestGenerator,
    StreamSession,
};
pub use types::{
    EngineEvent, FailureKind, GenerationError, JobId, JobProgress, SessionOutcome, Stage,
};
