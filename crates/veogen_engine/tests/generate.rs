use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use veogen_engine::{
    consume_stream, probe_image, Classification, EngineEvent, EventSink, FailureKind,
    GenerationError, GenerationRequest, Generator, LineReader, ReqwestGenerator, RequestSettings,
    Stage, StreamDecoder,
};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings_for(server: &MockServer) -> RequestSettings {
    RequestSettings {
        api_host: server.uri(),
        ..RequestSettings::default()
    }
}

fn request(stream: bool) -> GenerationRequest {
    GenerationRequest {
        model: "veo3-fast".to_string(),
        prompt: "a red kite over dunes".to_string(),
        start_image_url: None,
        extra_instructions: None,
        stream,
    }
}

#[tokio::test]
async fn streaming_session_accumulates_fragments() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n",
        "\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let outcome = generator
        .generate(1, "sk-test", &request(true), &sink)
        .await
        .expect("session ok");

    assert_eq!(outcome.text, "AB");
    assert_eq!(outcome.frames.len(), 2);
    assert_eq!(outcome.interruption, None);
    assert_eq!(outcome.resolution.classification, Classification::NoLink);

    let events = sink.take();
    let frames = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::StreamFrame { .. }))
        .count();
    assert_eq!(frames, 2);
    let stages: Vec<_> = events
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(progress) => Some(progress.stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![Stage::Requesting, Stage::Streaming, Stage::Resolving]
    );
}

#[tokio::test]
async fn streaming_session_resolves_media_url() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"done: \"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"https://cdn.example.com/clip.webm\"}}]}\n",
        "data: [DONE]\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let outcome = generator
        .generate(2, "sk-test", &request(true), &sink)
        .await
        .expect("session ok");

    assert_eq!(outcome.text, "done: https://cdn.example.com/clip.webm");
    assert_eq!(
        outcome.resolution.candidate.as_deref(),
        Some("https://cdn.example.com/clip.webm")
    );
    assert_eq!(
        outcome.resolution.classification,
        Classification::RecognizedMedia
    );
}

#[tokio::test]
async fn streaming_request_sends_expected_payload() {
    let server = MockServer::start().await;
    let expected = json!({
        "model": "veo3-fast",
        "messages": [{
            "role": "user",
            "content": [{"type": "text", "text": "a red kite over dunes"}]
        }],
        "stream": true
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_raw("data: [DONE]\n", "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let outcome = generator
        .generate(3, "sk-test", &request(true), &sink)
        .await
        .expect("session ok");
    assert_eq!(outcome.text, "");
}

#[tokio::test]
async fn http_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(402).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let err = generator
        .generate(4, "sk-test", &request(true), &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(402));
    assert_eq!(err.message, "quota exhausted");
}

#[tokio::test]
async fn non_streaming_response_resolves_media() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": [{"url": "https://x.com/v.webm"}]}}]
        })))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let outcome = generator
        .generate(5, "sk-test", &request(false), &sink)
        .await
        .expect("session ok");

    assert_eq!(outcome.text, "https://x.com/v.webm");
    assert!(outcome.frames.is_empty());
    assert_eq!(
        outcome.resolution.candidate.as_deref(),
        Some("https://x.com/v.webm")
    );
    assert_eq!(
        outcome.resolution.classification,
        Classification::RecognizedMedia
    );
}

#[tokio::test]
async fn non_streaming_invalid_json_is_upstream_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let err = generator
        .generate(6, "sk-test", &request(false), &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::UpstreamDecode);
}

#[tokio::test]
async fn non_streaming_missing_keys_resolve_to_no_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let generator = ReqwestGenerator::new(settings_for(&server));
    let sink = TestSink::new();

    let outcome = generator
        .generate(7, "sk-test", &request(false), &sink)
        .await
        .expect("session ok");
    assert_eq!(outcome.text, "");
    assert_eq!(outcome.resolution.classification, Classification::NoLink);
}

#[tokio::test]
async fn interrupted_stream_keeps_partial_text() {
    let chunks: Vec<Result<Bytes, GenerationError>> = vec![
        Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n",
        )),
        Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n",
        )),
        Err(GenerationError {
            kind: FailureKind::Network,
            message: "connection reset".to_string(),
        }),
    ];
    let mut reader = LineReader::new(futures_util::stream::iter(chunks));
    let sink = TestSink::new();

    let session = consume_stream(8, &mut reader, StreamDecoder::new(), &sink).await;

    assert_eq!(session.text, "AB");
    assert_eq!(session.frames.len(), 2);
    assert_eq!(session.interruption, Some(FailureKind::Network));
}

#[tokio::test]
async fn line_reader_reassembles_lines_across_chunks() {
    let chunks: Vec<Result<Bytes, GenerationError>> = vec![
        Ok(Bytes::from_static(b"data: {\"a\"")),
        Ok(Bytes::from_static(b":1}\r\ndata: [DO")),
        Ok(Bytes::from_static(b"NE]")),
    ];
    let mut reader = LineReader::new(futures_util::stream::iter(chunks));

    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("data: {\"a\":1}")
    );
    // Trailing unterminated line is flushed at end of stream.
    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("data: [DONE]")
    );
    assert_eq!(reader.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn probe_accepts_image_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/cover.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "image/png"))
        .mount(&server)
        .await;

    let settings = RequestSettings::default();
    let url = format!("{}/cover.png", server.uri());
    probe_image(&settings, &url).await.expect("probe ok");
}

#[tokio::test]
async fn probe_rejects_non_image_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let settings = RequestSettings::default();
    let url = format!("{}/page", server.uri());
    let err = probe_image(&settings, &url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::NotAnImage {
            content_type: "text/html; charset=utf-8".to_string()
        }
    );
}
