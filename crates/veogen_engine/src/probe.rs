use reqwest::header::CONTENT_TYPE;

use crate::request::RequestSettings;
use crate::transport::map_reqwest_error;
use crate::{FailureKind, GenerationError};

/// Checks that a first-frame image URL actually serves an image.
///
/// Issues a HEAD request (redirects followed) and requires a `Content-Type`
/// starting with `image/`. Runs before the generation request so a bad image
/// link fails fast instead of wasting a generation call.
pub async fn probe_image(
    settings: &RequestSettings,
    url: &str,
) -> Result<(), GenerationError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|err| GenerationError::new(FailureKind::InvalidUrl, err.to_string()))?;

    let client = reqwest::Client::builder()
        .timeout(settings.probe_timeout)
        .build()
        .map_err(|err| GenerationError::new(FailureKind::Network, err.to_string()))?;

    let response = client.head(parsed).send().await.map_err(map_reqwest_error)?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.starts_with("image/") {
        return Err(GenerationError::new(
            FailureKind::NotAnImage { content_type },
            "first-frame url does not serve an image; use a direct image link",
        ));
    }

    Ok(())
}
