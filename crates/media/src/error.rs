/// Crate-wide result type for media resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed media-resolution errors. Each rejection carries a distinct kind so
/// callers never have to inspect message text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("video format not supported: .{extension}. Use: mp4, avi, mov, mkv or webm")]
    UnsupportedVideoFormat { extension: String },

    #[error(
        "document format not supported: .{extension}. Use: pdf, doc, docx, xls, xlsx, \
         ppt, pptx, txt, rtf, csv, zip, rar, 7z, tar or gz"
    )]
    UnsupportedDocumentFormat { extension: String },

    #[error("only image, video, and document files are allowed (got {mime_type})")]
    UnsupportedMediaType { mime_type: String },

    #[error("file too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("could not download media from URL: {detail}")]
    DownloadFailed { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn download_failed(detail: impl Into<String>) -> Self {
        Self::DownloadFailed {
            detail: detail.into(),
        }
    }
}
