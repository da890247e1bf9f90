use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use serde::Deserialize;

use colourmagic_catalog::{CreateProduct, Product, UpdateProduct};
use colourmagic_infra::ImageUpload;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct MoveProductRequest {
    pub direction: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFeaturedRequest {
    pub featured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Admin product form, as posted by the create and edit pages.
///
/// Text fields: `name`, `description`, `price`, repeated `keepImageUrls`.
/// File fields: repeated `images`.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Option<String>,
    pub keep_image_urls: Vec<String>,
    pub images: Vec<ImageUpload>,
}

impl ProductForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, axum::response::Response> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "name" => form.name = text(field).await?,
                "description" => form.description = text(field).await?,
                "price" => form.price = Some(text(field).await?),
                "keepImageUrls" | "keepImageUrls[]" => {
                    let url = text(field).await?;
                    if !url.trim().is_empty() {
                        form.keep_image_urls.push(url);
                    }
                }
                "images" | "images[]" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.images
                        .push(ImageUpload::new(file_name, content_type, bytes.to_vec()));
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn into_create(self) -> (CreateProduct, Vec<ImageUpload>) {
        (
            CreateProduct {
                name: self.name,
                description: self.description,
                price: self.price,
            },
            self.images,
        )
    }

    pub fn into_update(self) -> (UpdateProduct, Vec<ImageUpload>) {
        (
            UpdateProduct {
                name: self.name,
                description: self.description,
                price: self.price,
                keep_image_urls: self.keep_image_urls,
            },
            self.images,
        )
    }
}

async fn text(field: Field<'_>) -> Result<String, axum::response::Response> {
    field.text().await.map_err(multipart_error)
}

fn multipart_error(err: MultipartError) -> axum::response::Response {
    errors::json_error(err.status(), "invalid_form", err.body_text())
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    let price_label = p.price_label();
    let cover_image = p.cover_image().map(str::to_string);
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "description": p.description,
        "price": p.price.map(|price| price.to_string()),
        "price_minor": p.price.map(|price| price.minor()),
        "price_label": price_label,
        "cover_image": cover_image,
        "image_urls": p.images.into_vec(),
        "sort_order": p.sort_order,
        "is_featured": p.is_featured,
        "created_at": p.created_at.to_rfc3339(),
    })
}

pub fn products_to_json(items: Vec<Product>) -> serde_json::Value {
    serde_json::json!({
        "items": items.into_iter().map(product_to_json).collect::<Vec<_>>(),
    })
}
