use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use colourmagic_catalog::{Product, ProductFilter, ProductPatch, ProductQuery};
use colourmagic_core::ProductId;

use super::{ProductStore, StoreError};

/// In-memory product store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: Product) -> Result<ProductId, StoreError> {
        let mut map = self.products.write().map_err(|_| Self::poisoned())?;
        let id = product.id;
        if map.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        map.insert(id, product);
        Ok(id)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError> {
        let mut map = self.products.write().map_err(|_| Self::poisoned())?;
        let product = map.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(product);
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut map = self.products.write().map_err(|_| Self::poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let map = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(query.run(map.values()))
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let map = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().filter(|p| filter.matches(p)).count() as u64)
    }
}
