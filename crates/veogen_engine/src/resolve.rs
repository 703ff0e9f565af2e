use serde_json::Value;

/// Video file extensions the player recognizes as direct media links.
pub const MEDIA_EXTENSIONS: [&str; 4] = [".mp4", ".mov", ".webm", ".mkv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Candidate URL ends in a known video extension.
    RecognizedMedia,
    /// A URL was found but it is not a recognized video file.
    UnrecognizedLink,
    /// The text contains no URL at all. Not an error.
    NoLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: Option<String>,
    pub classification: Classification,
}

/// Finds the first `http://` or `https://` substring followed by at least one
/// non-whitespace character. No percent-decoding and no validation beyond the
/// pattern; later matches are ignored.
pub fn find_first_url(text: &str) -> Option<&str> {
    let mut search = 0;
    while let Some(offset) = text[search..].find("http") {
        let start = search + offset;
        let rest = &text[start..];
        let scheme_len = if rest.starts_with("https://") {
            Some("https://".len())
        } else if rest.starts_with("http://") {
            Some("http://".len())
        } else {
            None
        };
        if let Some(scheme_len) = scheme_len {
            let end = rest
                .find(char::is_whitespace)
                .unwrap_or(rest.len());
            if end > scheme_len {
                return Some(&rest[..end]);
            }
        }
        search = start + "http".len();
    }
    None
}

/// Case-insensitive suffix match against the media allow-list.
pub fn classify(candidate: &str) -> Classification {
    let lower = candidate.to_ascii_lowercase();
    if MEDIA_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Classification::RecognizedMedia
    } else {
        Classification::UnrecognizedLink
    }
}

/// Resolves accumulated text into a candidate URL and its classification.
pub fn resolve_text(text: &str) -> Resolution {
    match find_first_url(text) {
        Some(url) => Resolution {
            candidate: Some(url.to_string()),
            classification: classify(url),
        },
        None => Resolution {
            candidate: None,
            classification: Classification::NoLink,
        },
    }
}

/// Extracts the content value from a full (non-streaming) response:
/// `choices[0].message.content[0]`, where the element is either a string or
/// an object exposing `url` or `text` (`url` preferred). Missing keys yield
/// `None` rather than an error.
pub fn extract_content_value(response: &Value) -> Option<String> {
    let first = response
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_array()?
        .first()?;

    match first {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => fields
            .get("url")
            .or_else(|| fields.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
