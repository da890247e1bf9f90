//! Store-agnostic product query vocabulary (filters, orderings, limits).
//!
//! Persistent stores translate these into SQL; the in-memory store evaluates them
//! directly through [`ProductQuery::run`].

use core::cmp::Ordering;

use colourmagic_core::ProductId;

use crate::product::Product;

/// Ordering applied to a product listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ProductOrder {
    /// `sort_order` ascending, newest first among equal positions (admin list, featured grid).
    #[default]
    Display,
    /// `sort_order` descending, newest first among equal positions (nearest item above).
    SortOrderDescNewestFirst,
    /// `sort_order` ascending, oldest first among equal positions (nearest item below).
    SortOrderAscOldestFirst,
    /// `created_at` descending (public catalog).
    NewestFirst,
}

impl ProductOrder {
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductOrder::Display => a
                .sort_order
                .cmp(&b.sort_order)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            ProductOrder::SortOrderDescNewestFirst => b
                .sort_order
                .cmp(&a.sort_order)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            ProductOrder::SortOrderAscOldestFirst => a
                .sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.created_at.cmp(&b.created_at)),
            ProductOrder::NewestFirst => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Conjunctive product filter; `None` fields do not constrain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductFilter {
    pub featured: Option<bool>,
    pub exclude_id: Option<ProductId>,
    /// Strictly less than.
    pub sort_order_below: Option<i64>,
    /// Strictly greater than.
    pub sort_order_above: Option<i64>,
    /// Case-insensitive substring of name or description.
    pub text: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn featured(value: bool) -> Self {
        Self {
            featured: Some(value),
            ..Self::default()
        }
    }

    pub fn matching_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        if self.exclude_id == Some(product.id) {
            return false;
        }
        if let Some(bound) = self.sort_order_below {
            if product.sort_order >= bound {
                return false;
            }
        }
        if let Some(bound) = self.sort_order_above {
            if product.sort_order <= bound {
                return false;
            }
        }
        if let Some(text) = self.text.as_deref() {
            let needle = text.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Filter + ordering + optional limit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub order: ProductOrder,
    pub limit: Option<usize>,
}

impl ProductQuery {
    pub fn new(filter: ProductFilter, order: ProductOrder) -> Self {
        Self {
            filter,
            order,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate the query over an in-memory collection.
    pub fn run<'a, I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut out: Vec<Product> = products
            .into_iter()
            .filter(|p| self.filter.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| self.order.compare(a, b));
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::test_support::product;

    #[test]
    fn display_order_breaks_ties_newest_first() {
        let older = product("older", 1, 10);
        let newer = product("newer", 1, 20);
        let first = product("first", 0, 5);

        let listed = ProductQuery::default().run([&older, &newer, &first]);
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "newer", "older"]);
    }

    #[test]
    fn text_filter_is_case_insensitive_over_name_and_description() {
        let mut cards = product("Business Cards", 1, 1);
        cards.description = "<p>350 GSM matte</p>".to_string();
        let flyer = product("Flyers", 2, 2);

        let by_name = ProductQuery::new(ProductFilter::matching_text("business"), ProductOrder::NewestFirst)
            .run([&cards, &flyer]);
        assert_eq!(by_name.len(), 1);

        let by_description =
            ProductQuery::new(ProductFilter::matching_text("gsm"), ProductOrder::NewestFirst)
                .run([&cards, &flyer]);
        assert_eq!(by_description[0].name, "Business Cards");
    }

    #[test]
    fn bounds_are_strict_and_exclusion_applies() {
        let a = product("a", 1, 1);
        let b = product("b", 2, 2);
        let c = product("c", 3, 3);

        let filter = ProductFilter {
            sort_order_above: Some(1),
            sort_order_below: Some(3),
            ..ProductFilter::default()
        };
        let hits = ProductQuery::new(filter, ProductOrder::Display).run([&a, &b, &c]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "b");

        let filter = ProductFilter {
            exclude_id: Some(b.id),
            ..ProductFilter::default()
        };
        let hits = ProductQuery::new(filter, ProductOrder::Display).run([&a, &b, &c]);
        assert!(hits.iter().all(|p| p.id != b.id));
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let a = product("a", 3, 1);
        let b = product("b", 1, 2);
        let hits = ProductQuery::default().with_limit(1).run([&a, &b]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "b");
    }
}
