use std::collections::VecDeque;

use engine_logging::engine_debug;
use serde::Deserialize;

/// Exact literal that marks normal end of stream, after prefix stripping.
pub const STREAM_SENTINEL: &str = "[DONE]";

/// How many raw frames the trailing log keeps for display.
pub const DEFAULT_TRAILING_CAPACITY: usize = 40;

const DATA_PREFIX: &str = "data:";

/// Hook applied to every extracted fragment before accumulation.
///
/// Exists because some transport stacks decode multi-byte characters through
/// a lossy single-byte codec; hosts whose text IO is already correct can plug
/// in [`IdentityNormalizer`] instead.
pub trait FragmentNormalizer: Send + Sync {
    fn normalize(&self, fragment: &str) -> String;
}

/// Reinterprets the fragment's chars as raw single-byte codepoints and
/// re-decodes them as UTF-8. Fragments that do not fit in single bytes, or
/// whose bytes are not valid UTF-8, pass through unchanged, so correctly
/// decoded text is never damaged.
#[derive(Debug, Default)]
pub struct LatinReinterpret;

impl FragmentNormalizer for LatinReinterpret {
    fn normalize(&self, fragment: &str) -> String {
        let mut bytes = Vec::with_capacity(fragment.len());
        for ch in fragment.chars() {
            let code_point = ch as u32;
            if code_point > 0xFF {
                return fragment.to_string();
            }
            bytes.push(code_point as u8);
        }
        match encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(&bytes) {
            Some(text) => text.into_owned(),
            None => fragment.to_string(),
        }
    }
}

/// Passes fragments through untouched.
#[derive(Debug, Default)]
pub struct IdentityNormalizer;

impl FragmentNormalizer for IdentityNormalizer {
    fn normalize(&self, fragment: &str) -> String {
        fragment.to_string()
    }
}

/// Chat-completion chunk shape: `{"choices":[{"delta":{"content":"..."}}]}`.
/// Anything else deserializes to an empty or content-less chunk, or fails and
/// is treated as an opaque frame.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Active,
    Terminated,
}

/// What one pushed line amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty or whitespace-only line; nothing recorded.
    Skipped,
    /// Frame joined the trailing log but carried no usable fragment.
    Logged { frame: String },
    /// Frame joined the trailing log and its content fragment (already
    /// normalized) was appended to the accumulated text.
    Fragment { frame: String, fragment: String },
    /// Sentinel seen, or the decoder was already terminated.
    Terminated,
}

/// Line-by-line decoder for the event stream.
///
/// Strips the `data:` framing prefix, detects the `[DONE]` sentinel, keeps a
/// bounded trailing log of raw frames, and accumulates content fragments in
/// arrival order. Malformed frames are absorbed: they stay in the log and
/// decoding continues.
pub struct StreamDecoder {
    state: DecoderState,
    text: String,
    trailing: VecDeque<String>,
    capacity: usize,
    normalizer: Box<dyn FragmentNormalizer>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_normalizer(Box::new(LatinReinterpret))
    }

    pub fn with_normalizer(normalizer: Box<dyn FragmentNormalizer>) -> Self {
        Self {
            state: DecoderState::Active,
            text: String::new(),
            trailing: VecDeque::new(),
            capacity: DEFAULT_TRAILING_CAPACITY,
            normalizer,
        }
    }

    pub fn with_trailing_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Feeds one raw transport line into the decoder.
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        if self.state == DecoderState::Terminated {
            return LineOutcome::Terminated;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineOutcome::Skipped;
        }

        let payload = trimmed
            .strip_prefix(DATA_PREFIX)
            .map(str::trim)
            .unwrap_or(trimmed);

        if payload == STREAM_SENTINEL {
            self.state = DecoderState::Terminated;
            return LineOutcome::Terminated;
        }

        // A bare "data:" prefix with nothing after it logs nothing.
        if payload.is_empty() {
            return LineOutcome::Skipped;
        }

        self.log_frame(payload);

        let chunk: StreamChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(err) => {
                engine_debug!("unparseable frame kept in log: {}", err);
                return LineOutcome::Logged {
                    frame: payload.to_string(),
                };
            }
        };

        let fragment = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty());

        match fragment {
            Some(raw) => {
                let normalized = self.normalizer.normalize(&raw);
                self.text.push_str(&normalized);
                LineOutcome::Fragment {
                    frame: payload.to_string(),
                    fragment: normalized,
                }
            }
            None => LineOutcome::Logged {
                frame: payload.to_string(),
            },
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DecoderState::Terminated
    }

    /// Accumulated text so far, untrimmed.
    pub fn accumulated(&self) -> &str {
        &self.text
    }

    pub fn trailing_log(&self) -> impl Iterator<Item = &str> {
        self.trailing.iter().map(String::as_str)
    }

    /// Ends the session: returns the trimmed accumulated text and the
    /// trailing raw-frame log, oldest first.
    pub fn finish(self) -> (String, Vec<String>) {
        let text = self.text.trim().to_string();
        (text, self.trailing.into_iter().collect())
    }

    fn log_frame(&mut self, frame: &str) {
        if self.trailing.len() == self.capacity {
            self.trailing.pop_front();
        }
        self.trailing.push_back(frame.to_string());
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
