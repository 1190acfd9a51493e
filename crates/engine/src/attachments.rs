//! Attachment ("bukti") storage.
//!
//! A save with a file attached uploads it first and only writes the
//! transaction once a URL came back. Stored objects are never deleted.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by an attachment upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload preset is not configured")]
    MissingPreset,
    #[error("uploaded file is empty")]
    Empty,
    #[error("file too large: {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("invalid content type: {0}, only images are accepted")]
    InvalidContentType(String),
    #[error("upload failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A file handed over by the form.
#[derive(Clone, Debug)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Stores an uploaded image and returns the URL it is reachable at.
#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    async fn upload(&self, file: AttachmentUpload) -> Result<String, UploadError>;
}

/// Keeps attachments on the local filesystem, grouped by upload preset.
#[derive(Clone, Debug)]
pub struct LocalAttachmentStorage {
    root: PathBuf,
    public_base_url: String,
    upload_preset: String,
    max_bytes: u64,
}

impl LocalAttachmentStorage {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        upload_preset: impl Into<String>,
        max_bytes: u64,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            upload_preset: upload_preset.into(),
            max_bytes,
        }
    }

    /// Checks the upload against the configured policy.
    pub fn validate(&self, file: &AttachmentUpload) -> Result<(), UploadError> {
        if self.upload_preset.trim().is_empty() {
            return Err(UploadError::MissingPreset);
        }
        if !file.content_type.starts_with("image/") {
            return Err(UploadError::InvalidContentType(file.content_type.clone()));
        }
        let size = file.bytes.len() as u64;
        if size == 0 {
            return Err(UploadError::Empty);
        }
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AttachmentStorage for LocalAttachmentStorage {
    async fn upload(&self, file: AttachmentUpload) -> Result<String, UploadError> {
        self.validate(&file)?;

        let name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&file.file_name));
        let dir = self.root.join(&self.upload_preset);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &file.bytes).await?;

        tracing::debug!(preset = %self.upload_preset, %name, "attachment stored");
        Ok(format!(
            "{}/{}/{}",
            self.public_base_url, self.upload_preset, name
        ))
    }
}

/// Replaces anything outside `[A-Za-z0-9._-]` with `_`.
fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}
