//! Infrastructure layer: product persistence, image uploads, sanitizing and the catalog
//! application services built on them.

pub mod blob;
pub mod catalog_service;
pub mod image_reconciler;
pub mod sanitizer;
pub mod store;

pub use blob::{BlobUploader, ImageUpload, UploadError};
pub use catalog_service::{CatalogError, CatalogService};
pub use image_reconciler::ImageSetReconciler;
pub use sanitizer::{AmmoniaSanitizer, HtmlSanitizer};
pub use store::{ProductStore, StoreError};
