//! Product persistence boundary.
//!
//! The catalog services only ever talk to a [`ProductStore`]; they make no assumption about
//! whether records live in memory or in Postgres.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use colourmagic_catalog::{Product, ProductFilter, ProductPatch, ProductQuery};
use colourmagic_core::ProductId;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

/// Product store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation, capacity).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// A record with the same id already exists.
    #[error("product {0} already exists")]
    Duplicate(ProductId),

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back into a product.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Object store for catalog products.
///
/// Semantics every implementation must honor:
/// - `update` applies only the fields present in the patch and fails with
///   [`StoreError::NotFound`] when the id is unknown; `delete` likewise.
/// - `list` evaluates [`ProductQuery`] exactly as [`ProductQuery::run`] does (filter, then
///   order, then limit).
/// - No operation spans more than one record; callers issuing several writes get no
///   atomicity across them.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, product: Product) -> Result<ProductId, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn create(&self, product: Product) -> Result<ProductId, StoreError> {
        (**self).create(product).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        (**self).list(query).await
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        (**self).count(filter).await
    }
}
