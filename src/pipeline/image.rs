//! Remote image resolution.
//!
//! The completion provider needs self-contained image payloads, so remote
//! URLs are fetched at request time and rewritten as base64 data URLs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;

use crate::core::errors::ApiError;

/// Resolves the caller-supplied image reference into an inline data URL.
/// Inline data passes through unchanged; `http(s)` URLs are fetched.
pub async fn resolve_image(client: &Client, image: &str) -> Result<String, ApiError> {
    if image.starts_with("http://") || image.starts_with("https://") {
        fetch_as_data_url(client, image).await
    } else {
        Ok(image.to_string())
    }
}

async fn fetch_as_data_url(client: &Client, url: &str) -> Result<String, ApiError> {
    let res = client
        .get(url)
        .send()
        .await
        .map_err(|e| ApiError::ImageFetch(e.to_string()))?;

    if !res.status().is_success() {
        return Err(ApiError::ImageFetch(format!(
            "{} returned {}",
            url,
            res.status()
        )));
    }

    let bytes = res
        .bytes()
        .await
        .map_err(|e| ApiError::ImageFetch(e.to_string()))?;

    let mime = guess_mime(url);
    Ok(format!("data:{};base64,{}", mime, BASE64.encode(&bytes)))
}

/// MIME type from the URL's file extension, defaulting to `image/png`.
fn guess_mime(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_inferred_from_extension() {
        assert_eq!(guess_mime("https://x/shot.jpeg"), "image/jpeg");
        assert_eq!(guess_mime("https://x/shot.PNG"), "image/png");
        assert_eq!(guess_mime("https://x/shot.webp?size=2"), "image/webp");
    }

    #[test]
    fn unknown_extension_defaults_to_png() {
        assert_eq!(guess_mime("https://x/shot"), "image/png");
        assert_eq!(guess_mime("https://x/shot.bin"), "image/png");
    }

    #[tokio::test]
    async fn inline_data_passes_through() {
        let client = Client::new();
        let data = "data:image/png;base64,AAAA";
        let resolved = resolve_image(&client, data).await.unwrap();
        assert_eq!(resolved, data);
    }
}
