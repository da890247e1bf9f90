//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Duplicate` | Insert with an id that already exists |
//! | Database (other) | Any other | `Unavailable` | Constraint or statement failure |
//! | PoolClosed | N/A | `Unavailable` | Connection pool was closed |
//! | ColumnDecode / ColumnNotFound | N/A | `Corrupt` | Row does not map onto `Product` |
//! | Other | N/A | `Unavailable` | Network errors, connection failures, etc. |
//!
//! Every statement touches a single row (or reads many); there are no multi-statement
//! transactions here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use colourmagic_catalog::{ImageSet, Price, Product, ProductFilter, ProductOrder, ProductPatch, ProductQuery};
use colourmagic_core::ProductId;

use super::{ProductStore, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, name, description, price_minor, image_urls, sort_order, is_featured, created_at FROM products";

/// Postgres-backed product store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Create a new PostgresProductStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `products` table and its ordering index when missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id           UUID PRIMARY KEY,
                name         TEXT NOT NULL,
                description  TEXT NOT NULL,
                price_minor  BIGINT NULL CHECK (price_minor >= 0),
                image_urls   TEXT[] NOT NULL DEFAULT '{}',
                sort_order   BIGINT NOT NULL,
                is_featured  BOOLEAN NOT NULL DEFAULT FALSE,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS products_display_order_idx ON products (sort_order, created_at DESC)",
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn create(&self, product: Product) -> Result<ProductId, StoreError> {
        let price_minor = price_to_column(product.price)?;
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price_minor, image_urls, sort_order, is_featured, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(price_minor)
        .bind(product.images.urls())
        .bind(product.sort_order)
        .bind(product.is_featured)
        .bind(product.created_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(product.id),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                Err(StoreError::Duplicate(product.id))
            }
            Err(e) => Err(map_sqlx_error("create", e)),
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return match self.get(id).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(id)),
            };
        }

        let price_minor = price_to_column(patch.price)?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = patch.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(description) = patch.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(price_minor) = price_minor {
                set.push("price_minor = ").push_bind_unseparated(price_minor);
            }
            if let Some(images) = patch.images {
                set.push("image_urls = ").push_bind_unseparated(images.into_vec());
            }
            if let Some(sort_order) = patch.sort_order {
                set.push("sort_order = ").push_bind_unseparated(sort_order);
            }
            if let Some(is_featured) = patch.is_featured {
                set.push("is_featured = ").push_bind_unseparated(is_featured);
            }
        }
        qb.push(" WHERE id = ").push_bind(*id.as_uuid());

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        push_filter(&mut qb, &query.filter);
        qb.push(order_clause(query.order));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(row_to_product).collect()
    }

    #[instrument(skip(self), err)]
    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) AS total FROM products");
        push_filter(&mut qb, filter);

        let row = qb
            .build()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {e}")))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");
    if let Some(featured) = filter.featured {
        qb.push(" AND is_featured = ").push_bind(featured);
    }
    if let Some(id) = filter.exclude_id {
        qb.push(" AND id <> ").push_bind(*id.as_uuid());
    }
    if let Some(bound) = filter.sort_order_below {
        qb.push(" AND sort_order < ").push_bind(bound);
    }
    if let Some(bound) = filter.sort_order_above {
        qb.push(" AND sort_order > ").push_bind(bound);
    }
    if let Some(text) = filter.text.as_deref() {
        let pattern = format!("%{}%", escape_like(text));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn order_clause(order: ProductOrder) -> &'static str {
    match order {
        ProductOrder::Display => " ORDER BY sort_order ASC, created_at DESC",
        ProductOrder::SortOrderDescNewestFirst => " ORDER BY sort_order DESC, created_at DESC",
        ProductOrder::SortOrderAscOldestFirst => " ORDER BY sort_order ASC, created_at ASC",
        ProductOrder::NewestFirst => " ORDER BY created_at DESC",
    }
}

/// Escape `LIKE` metacharacters so user text matches literally (default escape is `\`).
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn price_to_column(price: Option<Price>) -> Result<Option<i64>, StoreError> {
    price
        .map(|p| i64::try_from(p.minor()))
        .transpose()
        .map_err(|_| StoreError::Corrupt("price out of range".to_string()))
}

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    let corrupt = |column: &str, e: sqlx::Error| {
        StoreError::Corrupt(format!("failed to read column {column}: {e}"))
    };

    let id: Uuid = row.try_get("id").map_err(|e| corrupt("id", e))?;
    let price_minor: Option<i64> = row
        .try_get("price_minor")
        .map_err(|e| corrupt("price_minor", e))?;
    let image_urls: Vec<String> = row
        .try_get("image_urls")
        .map_err(|e| corrupt("image_urls", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| corrupt("created_at", e))?;

    let price = price_minor
        .map(|v| u64::try_from(v).map(Price::from_minor))
        .transpose()
        .map_err(|_| StoreError::Corrupt("negative price_minor".to_string()))?;

    Ok(Product {
        id: ProductId::from_uuid(id),
        name: row.try_get("name").map_err(|e| corrupt("name", e))?,
        description: row
            .try_get("description")
            .map_err(|e| corrupt("description", e))?,
        price,
        images: ImageSet::from_urls(image_urls),
        sort_order: row
            .try_get("sort_order")
            .map_err(|e| corrupt("sort_order", e))?,
        is_featured: row
            .try_get("is_featured")
            .map_err(|e| corrupt("is_featured", e))?,
        created_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("decode error in {operation}: {err}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
