use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use colourmagic_core::{DomainError, DomainResult, Entity, ProductId};

use crate::images::ImageSet;
use crate::price::Price;

/// A catalog product as stored and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Sanitized HTML.
    pub description: String,
    pub price: Option<Price>,
    pub images: ImageSet,
    pub sort_order: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// A freshly created, unfeatured product.
    pub fn new(
        id: ProductId,
        details: ProductDetails,
        images: ImageSet,
        sort_order: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: details.name,
            description: details.description,
            price: details.price,
            images,
            sort_order,
            is_featured: false,
            created_at,
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.cover()
    }

    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => price.label(),
            None => "Price on request".to_string(),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub images: Option<ImageSet>,
    pub sort_order: Option<i64>,
    pub is_featured: Option<bool>,
}

impl ProductPatch {
    pub fn sort_order(value: i64) -> Self {
        Self {
            sort_order: Some(value),
            ..Self::default()
        }
    }

    pub fn featured(value: bool) -> Self {
        Self {
            is_featured: Some(value),
            ..Self::default()
        }
    }

    /// Edit form fields plus the reconciled image set.
    pub fn details(details: ProductDetails, images: ImageSet) -> Self {
        Self {
            name: Some(details.name),
            description: Some(details.description),
            price: details.price,
            images: Some(images),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = Some(price);
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(sort_order) = self.sort_order {
            product.sort_order = sort_order;
        }
        if let Some(is_featured) = self.is_featured {
            product.is_featured = is_featured;
        }
    }
}

/// Validated name/description/price shared by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: Option<Price>,
}

impl ProductDetails {
    fn validate(name: &str, description: &str, price: Option<&str>) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if visible_text(description).is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }

        // A blank price field means "price on request" (or "unchanged" on edit).
        let price = match price.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(Price::parse(raw)?),
        };

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            price,
        })
    }
}

/// Command: create a product from the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: Option<String>,
}

impl CreateProduct {
    /// New products need at least one image.
    pub fn validate(&self, image_count: usize) -> DomainResult<ProductDetails> {
        let details = ProductDetails::validate(&self.name, &self.description, self.price.as_deref())?;
        if image_count == 0 {
            return Err(DomainError::validation("at least one image is required"));
        }
        Ok(details)
    }
}

/// Command: edit an existing product from the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateProduct {
    pub name: String,
    pub description: String,
    pub price: Option<String>,
    /// Existing image URLs the admin chose to keep, in display order.
    pub keep_image_urls: Vec<String>,
}

impl UpdateProduct {
    /// Images are optional on edit.
    pub fn validate(&self) -> DomainResult<ProductDetails> {
        ProductDetails::validate(&self.name, &self.description, self.price.as_deref())
    }
}

/// Text content of an HTML fragment: tags removed, `&nbsp;` folded to spaces, trimmed.
pub fn visible_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ").trim().to_string()
}
