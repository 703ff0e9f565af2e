use std::time::Duration;

use serde::Serialize;

/// Prompt sent when the user supplied no content at all.
const FALLBACK_PROMPT: &str = "Generate a video";

#[derive(Debug, Clone)]
pub struct RequestSettings {
    pub api_host: String,
    pub api_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            api_host: "https://api.apicore.ai".to_string(),
            api_path: "/v1/chat/completions".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

/// One generation request. `stream` fixes the session mode for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub start_image_url: Option<String>,
    pub extra_instructions: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct RequestPayload {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageRef,
        name: &'static str,
    },
}

#[derive(Debug, Serialize)]
struct ImageRef {
    url: String,
}

impl GenerationRequest {
    /// Builds the chat-completions body: one user message whose content list
    /// holds the prompt, the optional first-frame image (named
    /// `start_frame`), and any extra instructions, in that order.
    pub fn payload(&self) -> RequestPayload {
        let mut content = Vec::new();

        let prompt = self.prompt.trim();
        if !prompt.is_empty() {
            content.push(ContentPart::Text {
                text: prompt.to_string(),
            });
        }

        if let Some(url) = self.start_image_url.as_deref() {
            let url = url.trim();
            if !url.is_empty() {
                content.push(ContentPart::ImageUrl {
                    image_url: ImageRef {
                        url: url.to_string(),
                    },
                    name: "start_frame",
                });
            }
        }

        if let Some(extra) = self.extra_instructions.as_deref() {
            let extra = extra.trim();
            if !extra.is_empty() {
                content.push(ContentPart::Text {
                    text: extra.to_string(),
                });
            }
        }

        if content.is_empty() {
            content.push(ContentPart::Text {
                text: FALLBACK_PROMPT.to_string(),
            });
        }

        RequestPayload {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content,
            }],
            stream: self.stream,
        }
    }
}
