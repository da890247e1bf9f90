//! Store/uploader wiring behind the HTTP layer.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use colourmagic_infra::blob::{CloudinaryUploader, InMemoryBlobStore};
use colourmagic_infra::store::{InMemoryProductStore, PostgresProductStore};
use colourmagic_infra::{AmmoniaSanitizer, BlobUploader, CatalogService, ProductStore};

use crate::config::AppConfig;

pub type Catalog = CatalogService<Arc<dyn ProductStore>, Arc<dyn BlobUploader>, AmmoniaSanitizer>;

/// Shared, request-independent services handed to every handler.
pub struct AppServices {
    catalog: Catalog,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>, uploader: Arc<dyn BlobUploader>) -> Self {
        Self {
            catalog: CatalogService::new(store, uploader, AmmoniaSanitizer),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn ProductStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?;
            let store = PostgresProductStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("failed to prepare products schema")?;
            tracing::info!("using Postgres product store");
            Arc::new(store)
        }
        None => {
            tracing::info!("using in-memory product store");
            Arc::new(InMemoryProductStore::new())
        }
    };

    let uploader: Arc<dyn BlobUploader> = match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!(folder = %cloudinary.folder, "uploading images to Cloudinary");
            Arc::new(
                CloudinaryUploader::new(cloudinary.clone())
                    .context("failed to build Cloudinary client")?,
            )
        }
        None => {
            tracing::warn!("Cloudinary credentials not set; images are kept in memory");
            Arc::new(InMemoryBlobStore::new())
        }
    };

    Ok(AppServices::new(store, uploader))
}
