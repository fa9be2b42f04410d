//! Upload staging: temporary on-disk media with guaranteed cleanup.

use std::path::{Path, PathBuf};

use {tracing::warn, uuid::Uuid};

use crate::error::Result;

/// A media upload staged on disk, named `{field}-{uuid}.{ext}` under the
/// staging directory.
///
/// Removal is the owner's responsibility on every exit path; call
/// [`StagedUpload::discard`] after the send attempt resolves. Dropping the
/// guard without discarding removes the file best-effort, so an early
/// return or panic never leaves an orphan behind.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
    mime_type: String,
    size: u64,
    removed: bool,
}

impl StagedUpload {
    /// Write `data` to a fresh file under `dir`. The directory is created
    /// if missing. Callers validate the content *before* staging.
    pub async fn stage(
        dir: &Path,
        field: &str,
        original_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let mut file_name = format!("{field}-{}", Uuid::new_v4());
        if let Some(ext) = Path::new(original_name).extension().and_then(|e| e.to_str()) {
            file_name.push('.');
            file_name.push_str(&ext.to_ascii_lowercase());
        }
        let path = dir.join(file_name);
        tokio::fs::write(&path, data).await?;

        Ok(Self {
            path,
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size: data.len() as u64,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Read the staged bytes back for dispatch.
    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Remove the staged file. Failure is logged and otherwise ignored; it
    /// never changes the outcome of the request that staged the file.
    pub async fn discard(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "failed to remove staged upload");
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
