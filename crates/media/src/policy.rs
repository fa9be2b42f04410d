//! Content-type acceptance policy.
//!
//! Images are accepted unconditionally; videos and documents must match an
//! extension allowlist; everything else is rejected. The policy runs on the
//! declared MIME type plus the original file name, before any bytes are
//! committed to staging.

use crate::error::{Error, Result};

/// Per-item size ceiling: 100 MiB.
pub const MAX_MEDIA_BYTES: u64 = 100 * 1024 * 1024;

/// Video container extensions the transport's browser can reliably encode.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Document extensions accepted on the `application/*` branch.
pub const DOCUMENT_EXTENSIONS: [&str; 15] = [
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "zip", "rar", "7z",
    "tar", "gz",
];

/// Accepted top-level media kind of a validated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

/// Validate a declared content type against the acceptance policy.
pub fn classify(mime_type: &str, original_name: &str) -> Result<MediaKind> {
    if mime_type.starts_with("image/") {
        return Ok(MediaKind::Image);
    }

    let extension = extension_of(original_name);
    if mime_type.starts_with("video/") {
        if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(MediaKind::Video);
        }
        return Err(Error::UnsupportedVideoFormat { extension });
    }

    if mime_type.starts_with("application/") {
        if DOCUMENT_EXTENSIONS.contains(&extension.as_str()) {
            return Ok(MediaKind::Document);
        }
        return Err(Error::UnsupportedDocumentFormat { extension });
    }

    Err(Error::UnsupportedMediaType {
        mime_type: mime_type.to_string(),
    })
}

/// Enforce the per-item size ceiling.
pub fn check_size(size: u64) -> Result<()> {
    if size > MAX_MEDIA_BYTES {
        return Err(Error::PayloadTooLarge {
            size,
            limit: MAX_MEDIA_BYTES,
        });
    }
    Ok(())
}

/// Lowercased extension of a file name, without the dot.
fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}
