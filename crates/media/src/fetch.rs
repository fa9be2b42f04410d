//! Remote-URL media resolution.

use {bytes::Bytes, url::Url};

use crate::error::{Error, Result};

/// Media fetched from a remote URL, held in memory (no staging file).
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub mime_type: String,
    pub file_name: String,
    pub data: Bytes,
}

/// Download media from `url`. Any retrieval failure — an unparsable URL, a
/// non-success status, or an unreadable body — surfaces as
/// [`Error::DownloadFailed`].
pub async fn fetch_remote(client: &reqwest::Client, url: &str) -> Result<FetchedMedia> {
    let parsed = Url::parse(url).map_err(|e| Error::download_failed(format!("invalid URL: {e}")))?;

    let response = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(|e| Error::download_failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::download_failed(format!("HTTP {status}")));
    }

    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let data = response
        .bytes()
        .await
        .map_err(|e| Error::download_failed(e.to_string()))?;

    Ok(FetchedMedia {
        mime_type,
        file_name: file_name_from_url(&parsed),
        data,
    })
}

/// Best-effort display name for a URL-sourced item: the last non-empty path
/// segment, or `"media"` when the URL has none.
pub fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "media".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_path_segment() {
        let url = Url::parse("https://cdn.example.com/images/cat.png?v=2").unwrap();
        assert_eq!(file_name_from_url(&url), "cat.png");
    }

    #[test]
    fn bare_host_falls_back_to_media() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(file_name_from_url(&url), "media");
    }

    #[tokio::test]
    async fn invalid_url_is_a_download_failure() {
        let client = reqwest::Client::new();
        let err = fetch_remote(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, Error::DownloadFailed { .. }));
    }
}
