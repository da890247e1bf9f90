//! Image blob uploads.
//!
//! An uploader takes raw image bytes and returns the public URL the catalog stores.

pub mod cloudinary;
pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryUploader};
pub use in_memory::InMemoryBlobStore;

/// One image file received from the admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// `image/*` content types only.
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload service answered with a failure.
    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never completed (connection, TLS, timeout).
    #[error("upload transport failure: {0}")]
    Transport(String),

    /// The service answered 2xx but without a usable URL.
    #[error("invalid upload response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait BlobUploader: Send + Sync {
    /// Store one image and return its public URL.
    async fn upload(&self, upload: ImageUpload) -> Result<String, UploadError>;
}

#[async_trait]
impl<B> BlobUploader for Arc<B>
where
    B: BlobUploader + ?Sized,
{
    async fn upload(&self, upload: ImageUpload) -> Result<String, UploadError> {
        (**self).upload(upload).await
    }
}
