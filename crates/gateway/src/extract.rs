//! Multipart form extraction for the upload endpoints.
//!
//! Each file part is validated against the media policy *before* it is
//! staged, so a rejected part never commits a file; staged parts of a
//! request that later fails are released by their guards.

use std::path::Path;

use axum::extract::multipart::{Multipart, MultipartError};

use wagate_media::{StagedUpload, check_size, classify};

use crate::error::DispatchError;

/// Batch item count ceiling.
pub const MAX_BATCH_ITEMS: usize = 10;

/// Parsed upload form: text fields plus staged file parts, in input order.
pub struct UploadForm {
    pub phone: Option<String>,
    pub caption: Option<String>,
    pub files: Vec<StagedUpload>,
}

/// Read an upload form, staging at most `max_files` parts named
/// `file_field`. Unknown fields are ignored.
pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
    staging_dir: &Path,
    max_files: usize,
) -> Result<UploadForm, DispatchError> {
    let mut form = UploadForm {
        phone: None,
        caption: None,
        files: Vec::new(),
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "phone" {
            form.phone = Some(field.text().await.map_err(bad_multipart)?);
        } else if name == "caption" {
            form.caption = Some(field.text().await.map_err(bad_multipart)?);
        } else if name == file_field {
            if form.files.len() >= max_files {
                return Err(DispatchError::BadRequest {
                    detail: format!("too many files (limit {max_files})"),
                });
            }

            let original_name = field.file_name().unwrap_or("upload").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(bad_multipart)?;

            check_size(data.len() as u64)?;
            classify(&mime_type, &original_name)?;

            let staged =
                StagedUpload::stage(staging_dir, file_field, &original_name, &mime_type, &data)
                    .await?;
            form.files.push(staged);
        }
    }

    Ok(form)
}

fn bad_multipart(err: MultipartError) -> DispatchError {
    DispatchError::BadRequest {
        detail: err.to_string(),
    }
}
