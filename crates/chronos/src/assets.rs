//! Header logos.
//!
//! Logos are fetched once per document build and handed to the composer in
//! its [`BuildContext`](crate::compose::BuildContext). A logo that cannot be
//! fetched or decoded is simply absent; the composer draws a placeholder.

use pdf::RasterImage;

/// Decoded header logos for one build.
#[derive(Debug, Clone, Default)]
pub struct Logos {
    pub left: Option<RasterImage>,
    pub right: Option<RasterImage>,
}

/// Whether a logo source should be fetched over HTTP.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn fetch_bytes(client: &reqwest::Client, source: &str) -> Result<Vec<u8>, String> {
    if is_remote(source) {
        let response = client
            .get(source.trim())
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    } else {
        tokio::fs::read(source.trim())
            .await
            .map_err(|e| e.to_string())
    }
}

/// Fetch and decode one logo. Failures are logged and yield `None`.
pub async fn load_logo(client: &reqwest::Client, key: &str, source: Option<&str>) -> Option<RasterImage> {
    let source = source.map(str::trim).filter(|s| !s.is_empty())?;
    let bytes = match fetch_bytes(client, source).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Logo {source} unavailable: {e}");
            return None;
        }
    };
    match pdf::decode_image(key, &bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Logo {source} could not be decoded: {e}");
            None
        }
    }
}

/// Fetch both logos concurrently.
pub async fn load_logos(client: &reqwest::Client, left: Option<&str>, right: Option<&str>) -> Logos {
    let (left, right) = futures::future::join(
        load_logo(client, "logo-left", left),
        load_logo(client, "logo-right", right),
    )
    .await;
    Logos { left, right }
}
