//! Final image set for a product save.
//!
//! `kept ++ uploaded`, deduplicated (first occurrence wins) and capped at [`MAX_IMAGES`].
//! Uploads fan out concurrently; any single failure fails the whole call and nothing is
//! returned, so the caller never writes a partially uploaded set.

use futures_util::future::try_join_all;
use tracing::{debug, instrument, warn};

use colourmagic_catalog::{ImageSet, MAX_IMAGES, dedupe_preserving_order};

use crate::blob::{BlobUploader, ImageUpload, UploadError};

#[derive(Debug, Clone)]
pub struct ImageSetReconciler<B> {
    uploader: B,
}

impl<B> ImageSetReconciler<B>
where
    B: BlobUploader,
{
    pub fn new(uploader: B) -> Self {
        Self { uploader }
    }

    pub fn uploader(&self) -> &B {
        &self.uploader
    }

    /// Upload `files` and merge the resulting URLs after `kept`.
    ///
    /// At most [`MAX_IMAGES`] files are uploaded; the rest are ignored.
    #[instrument(skip_all, fields(kept = kept.len(), files = files.len()), err)]
    pub async fn reconcile(
        &self,
        kept: Vec<String>,
        mut files: Vec<ImageUpload>,
    ) -> Result<ImageSet, UploadError> {
        if files.len() > MAX_IMAGES {
            debug!(dropped = files.len() - MAX_IMAGES, "ignoring files beyond the image cap");
            files.truncate(MAX_IMAGES);
        }

        let kept = dedupe_preserving_order(kept);

        let uploaded = try_join_all(files.into_iter().map(|file| self.uploader.upload(file)))
            .await
            .inspect_err(|e| warn!(error = %e, "image upload failed; save aborted"))?;

        Ok(ImageSet::merge(kept, uploaded))
    }
}
