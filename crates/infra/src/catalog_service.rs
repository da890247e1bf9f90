//! Catalog application service: ordering, featured set, create/edit/delete and reads.
//!
//! Every operation is request-scoped and reads its state from the store on each call.
//! There is no cross-request coordination:
//! - `move_product` issues two independent writes; a failure between them leaves only the
//!   first applied.
//! - `set_featured(true)` checks the featured count and then writes, so concurrent calls can
//!   push the total past [`MAX_FEATURED`].

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use colourmagic_catalog::{
    CreateProduct, MAX_FEATURED, MoveDirection, Product, ProductFilter, ProductOrder,
    ProductPatch, ProductQuery, UpdateProduct, ensure_featured_capacity, next_sort_order,
    plan_swap,
};
use colourmagic_core::{DomainError, ProductId};

use crate::blob::{BlobUploader, ImageUpload, UploadError};
use crate::image_reconciler::ImageSetReconciler;
use crate::sanitizer::HtmlSanitizer;
use crate::store::{ProductStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found")]
    NotFound,

    #[error("capacity exceeded: at most {limit} {what} allowed")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CatalogError::Validation(msg),
            DomainError::InvalidId(msg) => CatalogError::Validation(msg),
            DomainError::NotFound => CatalogError::NotFound,
            DomainError::CapacityExceeded { what, limit } => {
                CatalogError::CapacityExceeded { what, limit }
            }
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => CatalogError::NotFound,
            other => CatalogError::Store(other),
        }
    }
}

pub struct CatalogService<S, B, H> {
    store: S,
    reconciler: ImageSetReconciler<B>,
    sanitizer: H,
}

impl<S, B, H> CatalogService<S, B, H>
where
    S: ProductStore,
    B: BlobUploader,
    H: HtmlSanitizer,
{
    pub fn new(store: S, uploader: B, sanitizer: H) -> Self {
        Self {
            store,
            reconciler: ImageSetReconciler::new(uploader),
            sanitizer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Swap the product with its neighbor in display order.
    ///
    /// Missing ids and products already at the boundary are no-ops.
    #[instrument(skip(self), fields(product_id = %id, direction = %direction), err)]
    pub async fn move_product(
        &self,
        id: ProductId,
        direction: MoveDirection,
    ) -> Result<(), CatalogError> {
        let Some(target) = self.store.get(id).await? else {
            debug!("move ignored: product does not exist");
            return Ok(());
        };

        let neighbor = self
            .store
            .list(&direction.neighbor_query(target.sort_order))
            .await?
            .into_iter()
            .next();

        let Some(swap) = plan_swap(&target, neighbor.as_ref()) else {
            debug!("move ignored: product already at the boundary");
            return Ok(());
        };

        self.store
            .update(swap.target, ProductPatch::sort_order(swap.target_sort_order))
            .await?;
        self.store
            .update(swap.neighbor, ProductPatch::sort_order(swap.neighbor_sort_order))
            .await?;

        debug!(
            neighbor_id = %swap.neighbor,
            sort_order = swap.target_sort_order,
            "product moved"
        );
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id, featured = value), err)]
    pub async fn set_featured(&self, id: ProductId, value: bool) -> Result<(), CatalogError> {
        if value {
            let featured = self.store.count(&ProductFilter::featured(true)).await?;
            ensure_featured_capacity(usize::try_from(featured).unwrap_or(usize::MAX))
                .inspect_err(|_| warn!(featured, "featured set is full"))?;
        }

        self.store.update(id, ProductPatch::featured(value)).await?;
        Ok(())
    }

    /// Position for a new product: `max(sort_order) + 1`, or 1 on an empty catalog.
    pub async fn next_sort_order(&self) -> Result<i64, CatalogError> {
        let top = self
            .store
            .list(
                &ProductQuery::new(ProductFilter::all(), ProductOrder::SortOrderDescNewestFirst)
                    .with_limit(1),
            )
            .await?;
        Ok(next_sort_order(top.first().map(|p| p.sort_order)))
    }

    /// Hard delete; remaining positions are left as they are.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        self.store.delete(id).await?;
        info!("product deleted");
        Ok(())
    }

    /// Validate, upload images, then insert at the end of the display order.
    #[instrument(skip_all, fields(name = %cmd.name, files = files.len()), err)]
    pub async fn create_product(
        &self,
        cmd: CreateProduct,
        files: Vec<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        let files = accept_uploads(files)?;
        let cmd = CreateProduct {
            description: self.sanitizer.sanitize(&cmd.description),
            ..cmd
        };
        let details = cmd.validate(files.len())?;

        let images = self.reconciler.reconcile(Vec::new(), files).await?;
        let sort_order = self.next_sort_order().await?;

        let product = Product::new(ProductId::new(), details, images, sort_order, Utc::now());
        self.store.create(product.clone()).await?;

        info!(product_id = %product.id, sort_order, "product created");
        Ok(product)
    }

    /// Replace name/description, optionally price, and the image set.
    ///
    /// Kept URLs not currently on the product are ignored. Keeping nothing and uploading
    /// nothing leaves the product without images.
    #[instrument(skip(self, cmd, files), fields(product_id = %id, files = files.len()), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        cmd: UpdateProduct,
        files: Vec<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        let files = accept_uploads(files)?;
        let cmd = UpdateProduct {
            description: self.sanitizer.sanitize(&cmd.description),
            ..cmd
        };
        let details = cmd.validate()?;

        let existing = self.store.get(id).await?.ok_or(CatalogError::NotFound)?;
        let kept: Vec<String> = cmd
            .keep_image_urls
            .into_iter()
            .filter(|url| existing.images.urls().contains(url))
            .collect();

        let images = self.reconciler.reconcile(kept, files).await?;
        self.store
            .update(id, ProductPatch::details(details, images))
            .await?;

        info!("product updated");
        self.get_product(id).await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Every product in display order.
    pub async fn admin_list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .store
            .list(&ProductQuery::new(ProductFilter::all(), ProductOrder::Display))
            .await?)
    }

    /// Newest first, optionally narrowed by a case-insensitive name/description match.
    pub async fn public_list(&self, text: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let filter = match text.map(str::trim) {
            Some(text) if !text.is_empty() => ProductFilter::matching_text(text),
            _ => ProductFilter::all(),
        };
        Ok(self
            .store
            .list(&ProductQuery::new(filter, ProductOrder::NewestFirst))
            .await?)
    }

    /// Featured products in display order.
    pub async fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .store
            .list(
                &ProductQuery::new(ProductFilter::featured(true), ProductOrder::Display)
                    .with_limit(MAX_FEATURED),
            )
            .await?)
    }
}

/// Drop empty file parts and reject anything that is not an image.
fn accept_uploads(files: Vec<ImageUpload>) -> Result<Vec<ImageUpload>, CatalogError> {
    let files: Vec<ImageUpload> = files.into_iter().filter(|f| !f.bytes.is_empty()).collect();
    if let Some(bad) = files.iter().find(|f| !f.is_image()) {
        return Err(CatalogError::Validation(format!(
            "only image files can be uploaded ({} is {})",
            bad.file_name, bad.content_type
        )));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};

    use colourmagic_catalog::{ImageSet, Price};

    use super::*;
    use crate::blob::InMemoryBlobStore;
    use crate::sanitizer::AmmoniaSanitizer;
    use crate::store::InMemoryProductStore;

    type Service<S = Arc<InMemoryProductStore>> =
        CatalogService<S, Arc<InMemoryBlobStore>, AmmoniaSanitizer>;

    fn at(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(offset)
    }

    fn stored(name: &str, sort_order: i64, offset: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            description: format!("<p>{name} description</p>"),
            price: None,
            images: ImageSet::from_urls(vec![format!("https://img.test/{name}.png")]),
            sort_order,
            is_featured: false,
            created_at: at(offset),
        }
    }

    fn image(name: &str) -> ImageUpload {
        ImageUpload::new(name, "image/png", vec![1, 2, 3])
    }

    fn service() -> (Service, Arc<InMemoryProductStore>, Arc<InMemoryBlobStore>) {
        let store = Arc::new(InMemoryProductStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let service = CatalogService::new(store.clone(), blobs.clone(), AmmoniaSanitizer);
        (service, store, blobs)
    }

    async fn seed(store: &InMemoryProductStore, products: &[Product]) {
        for p in products {
            store.create(p.clone()).await.unwrap();
        }
    }

    async fn admin_names<S: ProductStore>(service: &Service<S>) -> Vec<String> {
        service
            .admin_list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect()
    }

    fn create_cmd(name: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: "<p>Premium stock</p>".to_string(),
            price: Some("450".to_string()),
        }
    }

    // --- next_sort_order ---

    #[tokio::test]
    async fn next_sort_order_on_empty_catalog_is_one() {
        let (service, _, _) = service();
        assert_eq!(service.next_sort_order().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn next_sort_order_follows_the_maximum() {
        let (service, store, _) = service();
        seed(&store, &[stored("a", 3, 1), stored("b", 7, 2), stored("c", 5, 3)]).await;
        assert_eq!(service.next_sort_order().await.unwrap(), 8);
    }

    // --- move_product ---

    #[tokio::test]
    async fn move_up_then_down_round_trips() {
        let (service, store, _) = service();
        let products = [stored("a", 1, 1), stored("b", 2, 2), stored("c", 3, 3)];
        seed(&store, &products).await;
        let before = admin_names(&service).await;

        service.move_product(products[1].id, MoveDirection::Up).await.unwrap();
        assert_eq!(admin_names(&service).await, vec!["b", "a", "c"]);

        service.move_product(products[1].id, MoveDirection::Down).await.unwrap();
        assert_eq!(admin_names(&service).await, before);
    }

    #[tokio::test]
    async fn moves_past_the_ends_are_noops() {
        let (service, store, _) = service();
        let products = [stored("a", 1, 1), stored("b", 2, 2), stored("c", 3, 3)];
        seed(&store, &products).await;

        service.move_product(products[0].id, MoveDirection::Up).await.unwrap();
        service.move_product(products[2].id, MoveDirection::Down).await.unwrap();

        assert_eq!(admin_names(&service).await, vec!["a", "b", "c"]);
        let first = store.get(products[0].id).await.unwrap().unwrap();
        assert_eq!(first.sort_order, 1);
    }

    #[tokio::test]
    async fn moving_a_missing_product_is_a_silent_noop() {
        let (service, store, _) = service();
        seed(&store, &[stored("a", 1, 1)]).await;
        service
            .move_product(ProductId::new(), MoveDirection::Down)
            .await
            .unwrap();
        assert_eq!(admin_names(&service).await, vec!["a"]);
    }

    #[tokio::test]
    async fn move_swaps_across_gaps() {
        let (service, store, _) = service();
        let products = [stored("a", 10, 1), stored("b", 40, 2)];
        seed(&store, &products).await;

        service.move_product(products[0].id, MoveDirection::Down).await.unwrap();

        assert_eq!(store.get(products[0].id).await.unwrap().unwrap().sort_order, 40);
        assert_eq!(store.get(products[1].id).await.unwrap().unwrap().sort_order, 10);
    }

    /// Store whose n-th `update` call (1-based) fails.
    struct FlakyStore {
        inner: InMemoryProductStore,
        updates: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl ProductStore for FlakyStore {
        async fn create(&self, product: Product) -> Result<ProductId, StoreError> {
            self.inner.create(product).await
        }
        async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.get(id).await
        }
        async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError> {
            if self.updates.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
        async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
            self.inner.list(query).await
        }
        async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
            self.inner.count(filter).await
        }
    }

    #[tokio::test]
    async fn failed_second_swap_write_leaves_the_first_applied() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryProductStore::new(),
            updates: AtomicUsize::new(0),
            fail_at: 2,
        });
        let a = stored("a", 1, 1);
        let b = stored("b", 2, 2);
        store.create(a.clone()).await.unwrap();
        store.create(b.clone()).await.unwrap();
        let service: Service<Arc<FlakyStore>> =
            CatalogService::new(store.clone(), Arc::new(InMemoryBlobStore::new()), AmmoniaSanitizer);

        let err = service.move_product(b.id, MoveDirection::Up).await.unwrap_err();
        assert!(matches!(err, CatalogError::Store(StoreError::Unavailable(_))));

        // Both now share position 1. Moves only look strictly above or below, so neither
        // can swap with the other; only a move against some third product separates them.
        assert_eq!(store.get(b.id).await.unwrap().unwrap().sort_order, 1);
        assert_eq!(store.get(a.id).await.unwrap().unwrap().sort_order, 1);
    }

    // --- set_featured ---

    async fn seed_many(store: &InMemoryProductStore, n: usize) -> Vec<Product> {
        let products: Vec<Product> = (0..n)
            .map(|i| stored(&format!("p{i}"), i as i64 + 1, i as i64))
            .collect();
        seed(store, &products).await;
        products
    }

    #[tokio::test]
    async fn thirteenth_feature_is_rejected_without_a_write() {
        let (service, store, _) = service();
        let products = seed_many(&store, 13).await;

        for p in &products[..12] {
            service.set_featured(p.id, true).await.unwrap();
        }

        let err = service.set_featured(products[12].id, true).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CapacityExceeded { limit: 12, .. }
        ));
        assert!(!store.get(products[12].id).await.unwrap().unwrap().is_featured);
        assert_eq!(store.count(&ProductFilter::featured(true)).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn unfeaturing_always_succeeds_and_frees_a_slot() {
        let (service, store, _) = service();
        let products = seed_many(&store, 13).await;
        for p in &products[..12] {
            service.set_featured(p.id, true).await.unwrap();
        }

        service.set_featured(products[0].id, false).await.unwrap();
        service.set_featured(products[12].id, true).await.unwrap();

        assert_eq!(store.count(&ProductFilter::featured(true)).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn featuring_a_missing_product_is_not_found() {
        let (service, _, _) = service();
        let err = service.set_featured(ProductId::new(), true).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    /// Another admin features `intruder` between our count and our write.
    struct RacingStore {
        inner: Arc<InMemoryProductStore>,
        intruder: ProductId,
    }

    #[async_trait]
    impl ProductStore for RacingStore {
        async fn create(&self, product: Product) -> Result<ProductId, StoreError> {
            self.inner.create(product).await
        }
        async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.get(id).await
        }
        async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
        async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
            self.inner.list(query).await
        }
        async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
            let stale = self.inner.count(filter).await?;
            self.inner
                .update(self.intruder, ProductPatch::featured(true))
                .await?;
            Ok(stale)
        }
    }

    /// Known limitation: the capacity check is check-then-act, so a concurrent feature
    /// landing between the count and the write can push the total to 13.
    #[tokio::test]
    async fn concurrent_feature_can_overshoot_the_cap() {
        let inner = Arc::new(InMemoryProductStore::new());
        let products = seed_many(&inner, 13).await;
        for p in &products[..11] {
            inner.update(p.id, ProductPatch::featured(true)).await.unwrap();
        }

        let service: Service<RacingStore> = CatalogService::new(
            RacingStore {
                inner: inner.clone(),
                intruder: products[11].id,
            },
            Arc::new(InMemoryBlobStore::new()),
            AmmoniaSanitizer,
        );

        service.set_featured(products[12].id, true).await.unwrap();
        assert_eq!(inner.count(&ProductFilter::featured(true)).await.unwrap(), 13);
    }

    // --- delete ---

    #[tokio::test]
    async fn delete_removes_only_the_target_and_keeps_positions() {
        let (service, store, _) = service();
        let products = [stored("a", 1, 1), stored("b", 2, 2), stored("c", 3, 3)];
        seed(&store, &products).await;

        service.delete_product(products[1].id).await.unwrap();

        assert_eq!(admin_names(&service).await, vec!["a", "c"]);
        assert_eq!(store.get(products[0].id).await.unwrap().unwrap().sort_order, 1);
        assert_eq!(store.get(products[2].id).await.unwrap().unwrap().sort_order, 3);
        assert_eq!(service.next_sort_order().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn deleting_a_missing_product_is_not_found() {
        let (service, _, _) = service();
        let err = service.delete_product(ProductId::new()).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    // --- create ---

    #[tokio::test]
    async fn create_appends_at_the_end_unfeatured() {
        let (service, store, blobs) = service();
        seed(&store, &[stored("a", 5, 1)]).await;

        let product = service
            .create_product(create_cmd("Business Cards"), vec![image("front.png"), image("back.png")])
            .await
            .unwrap();

        assert_eq!(product.sort_order, 6);
        assert!(!product.is_featured);
        assert_eq!(product.price, Some(Price::from_minor(45_000)));
        assert_eq!(product.images.len(), 2);
        assert_eq!(blobs.len(), 2);
        assert_eq!(store.get(product.id).await.unwrap(), Some(product));
    }

    #[tokio::test]
    async fn create_without_images_is_rejected_before_any_write() {
        let (service, store, blobs) = service();
        let err = service.create_product(create_cmd("Flyers"), vec![]).await.unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(store.count(&ProductFilter::all()).await.unwrap(), 0);
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn empty_file_parts_do_not_count_as_images() {
        let (service, _, _) = service();
        let empty = ImageUpload::new("blank.png", "image/png", vec![]);
        let err = service
            .create_product(create_cmd("Flyers"), vec![empty])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn non_image_uploads_are_rejected() {
        let (service, _, blobs) = service();
        let pdf = ImageUpload::new("menu.pdf", "application/pdf", vec![1]);
        let err = service
            .create_product(create_cmd("Menus"), vec![image("a.png"), pdf])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(msg) if msg.contains("menu.pdf")));
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn create_stores_sanitized_description() {
        let (service, _, _) = service();
        let cmd = CreateProduct {
            description: r#"<p>Glossy</p><script>alert(1)</script>"#.to_string(),
            ..create_cmd("Stickers")
        };
        let product = service.create_product(cmd, vec![image("s.png")]).await.unwrap();
        assert_eq!(product.description, "<p>Glossy</p>");
    }

    #[tokio::test]
    async fn description_of_only_script_is_empty_after_sanitizing() {
        let (service, _, _) = service();
        let cmd = CreateProduct {
            description: "<script>alert(1)</script>".to_string(),
            ..create_cmd("Stickers")
        };
        let err = service.create_product(cmd, vec![image("s.png")]).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn create_caps_images_at_eight() {
        let (service, _, _) = service();
        let files: Vec<ImageUpload> = (0..10).map(|i| image(&format!("{i}.png"))).collect();
        let product = service.create_product(create_cmd("Banners"), files).await.unwrap();
        assert_eq!(product.images.len(), 8);
    }

    struct BrokenUploader;

    #[async_trait]
    impl BlobUploader for BrokenUploader {
        async fn upload(&self, _upload: ImageUpload) -> Result<String, UploadError> {
            Err(UploadError::Transport("timed out".to_string()))
        }
    }

    #[tokio::test]
    async fn upload_failure_creates_nothing() {
        let store = Arc::new(InMemoryProductStore::new());
        let service = CatalogService::new(store.clone(), BrokenUploader, AmmoniaSanitizer);

        let err = service
            .create_product(create_cmd("Posters"), vec![image("p.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Upload(UploadError::Transport(_))));
        assert_eq!(store.count(&ProductFilter::all()).await.unwrap(), 0);
    }

    // --- update ---

    fn update_cmd(name: &str, price: Option<&str>, keep: &[&str]) -> UpdateProduct {
        UpdateProduct {
            name: name.to_string(),
            description: "<p>Updated</p>".to_string(),
            price: price.map(str::to_string),
            keep_image_urls: keep.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn update_keeps_selected_images_and_appends_uploads() {
        let (service, store, _) = service();
        let mut original = stored("cards", 1, 1);
        original.images = ImageSet::from_urls(vec![
            "https://img.test/a".to_string(),
            "https://img.test/b".to_string(),
            "https://img.test/c".to_string(),
        ]);
        original.price = Some(Price::from_minor(900));
        seed(&store, &[original.clone()]).await;

        let updated = service
            .update_product(
                original.id,
                update_cmd("Cards v2", None, &["https://img.test/c", "https://img.test/a"]),
                vec![image("new.png")],
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Cards v2");
        assert_eq!(updated.price, Some(Price::from_minor(900)));
        assert_eq!(updated.images.len(), 3);
        assert_eq!(&updated.images.urls()[..2], ["https://img.test/c", "https://img.test/a"]);
        assert!(updated.images.urls()[2].starts_with("memory://blobs/"));
        assert_eq!(updated.sort_order, original.sort_order);
    }

    #[tokio::test]
    async fn update_replaces_price_when_supplied() {
        let (service, store, _) = service();
        let original = stored("cards", 1, 1);
        seed(&store, &[original.clone()]).await;

        let updated = service
            .update_product(original.id, update_cmd("cards", Some("12.5"), &[]), vec![])
            .await
            .unwrap();
        assert_eq!(updated.price, Some(Price::from_minor(1_250)));
    }

    #[tokio::test]
    async fn editing_to_zero_images_succeeds() {
        let (service, store, _) = service();
        let original = stored("cards", 1, 1);
        seed(&store, &[original.clone()]).await;

        let updated = service
            .update_product(original.id, update_cmd("cards", None, &[]), vec![])
            .await
            .unwrap();
        assert!(updated.images.is_empty());
    }

    #[tokio::test]
    async fn kept_urls_must_belong_to_the_product() {
        let (service, store, _) = service();
        let original = stored("cards", 1, 1);
        seed(&store, &[original.clone()]).await;

        let updated = service
            .update_product(
                original.id,
                update_cmd("cards", None, &["https://elsewhere.test/x.png", "https://img.test/cards.png"]),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(updated.images.urls(), ["https://img.test/cards.png"]);
    }

    #[tokio::test]
    async fn updating_a_missing_product_uploads_nothing() {
        let (service, _, blobs) = service();
        let err = service
            .update_product(ProductId::new(), update_cmd("x", None, &[]), vec![image("x.png")])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn update_upload_failure_leaves_record_untouched() {
        let store = Arc::new(InMemoryProductStore::new());
        let original = stored("cards", 1, 1);
        seed(&store, &[original.clone()]).await;
        let service = CatalogService::new(store.clone(), BrokenUploader, AmmoniaSanitizer);

        let err = service
            .update_product(original.id, update_cmd("renamed", None, &[]), vec![image("n.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Upload(_)));
        assert_eq!(store.get(original.id).await.unwrap(), Some(original));
    }

    // --- reads ---

    #[tokio::test]
    async fn public_list_searches_name_and_description_newest_first() {
        let (service, store, _) = service();
        let mut mugs = stored("Photo Mugs", 1, 1);
        mugs.description = "<p>Ceramic</p>".to_string();
        let mut cards = stored("Cards", 2, 2);
        cards.description = "<p>Matte PHOTO finish</p>".to_string();
        let banner = stored("Banner", 3, 3);
        seed(&store, &[mugs, cards, banner]).await;

        let names = |list: Vec<Product>| list.into_iter().map(|p| p.name).collect::<Vec<_>>();

        assert_eq!(
            names(service.public_list(Some("photo")).await.unwrap()),
            vec!["Cards", "Photo Mugs"]
        );
        assert_eq!(
            names(service.public_list(Some("  ")).await.unwrap()),
            vec!["Banner", "Cards", "Photo Mugs"]
        );
        assert!(service.public_list(Some("vinyl")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn featured_lists_in_display_order() {
        let (service, store, _) = service();
        let products = [stored("a", 3, 1), stored("b", 1, 2), stored("c", 2, 3)];
        seed(&store, &products).await;
        service.set_featured(products[0].id, true).await.unwrap();
        service.set_featured(products[1].id, true).await.unwrap();

        let featured: Vec<String> = service
            .featured()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(featured, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn get_missing_product_is_not_found() {
        let (service, _, _) = service();
        assert!(matches!(
            service.get_product(ProductId::new()).await,
            Err(CatalogError::NotFound)
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of sequential feature toggles exceeds the cap.
            #[test]
            fn featured_count_never_exceeds_cap(
                ops in proptest::collection::vec((0usize..16, any::<bool>()), 1..60),
            ) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let count = rt.block_on(async {
                    let (service, store, _) = service();
                    let products = seed_many(&store, 16).await;
                    for (idx, value) in ops {
                        match service.set_featured(products[idx].id, value).await {
                            Ok(()) | Err(CatalogError::CapacityExceeded { .. }) => {}
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                    store.count(&ProductFilter::featured(true)).await.unwrap()
                });
                prop_assert!(count <= MAX_FEATURED as u64);
            }
        }
    }
}
