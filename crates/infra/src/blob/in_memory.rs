use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{BlobUploader, ImageUpload, UploadError};

/// In-memory blob store handing out `memory://blobs/<uuid>` URLs.
///
/// Used when no image host is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, ImageUpload>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<ImageUpload> {
        self.blobs.read().ok()?.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobUploader for InMemoryBlobStore {
    async fn upload(&self, upload: ImageUpload) -> Result<String, UploadError> {
        let url = format!("memory://blobs/{}", Uuid::now_v7());
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| UploadError::Transport("lock poisoned".to_string()))?;
        blobs.insert(url.clone(), upload);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uploads_are_retrievable_by_url() {
        let store = InMemoryBlobStore::new();
        let upload = ImageUpload::new("card.png", "image/png", vec![1, 2, 3]);

        let first = store.upload(upload.clone()).await.unwrap();
        let second = store.upload(upload.clone()).await.unwrap();

        assert!(first.starts_with("memory://blobs/"));
        assert_ne!(first, second);
        assert_eq!(store.get(&first), Some(upload));
        assert_eq!(store.len(), 2);
    }
}
