//! Catalog domain module.
//!
//! This crate contains the business rules for the printing catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod contact;
pub mod featured;
pub mod images;
pub mod ordering;
pub mod price;
pub mod product;
pub mod query;

pub use contact::{ContactEnquiry, ContactField};
pub use featured::{MAX_FEATURED, ensure_featured_capacity};
pub use images::{ImageSet, MAX_IMAGES, dedupe_preserving_order};
pub use ordering::{MoveDirection, SortSwap, display_order, next_sort_order, plan_swap};
pub use price::{MAX_PRICE_MINOR, Price};
pub use product::{CreateProduct, Product, ProductDetails, ProductPatch, UpdateProduct, visible_text};
pub use query::{ProductFilter, ProductOrder, ProductQuery};
