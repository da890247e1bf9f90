//! Catalog display ordering.
//!
//! Products are ordered by an integer `sort_order`. Reordering only ever swaps the
//! positions of two adjacent products, so gaps in the sequence are harmless and no
//! renumbering pass is needed.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use colourmagic_core::{DomainError, ProductId};

use crate::product::Product;
use crate::query::{ProductFilter, ProductOrder, ProductQuery};

/// Direction of a single-step move in the admin list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
        }
    }

    /// Query selecting the adjacent product to swap with.
    ///
    /// `Up` picks the greatest `sort_order` strictly below `current` (latest created wins a tie);
    /// `Down` picks the smallest strictly above (earliest created wins a tie).
    pub fn neighbor_query(self, current: i64) -> ProductQuery {
        let (filter, order) = match self {
            MoveDirection::Up => (
                ProductFilter {
                    sort_order_below: Some(current),
                    ..ProductFilter::default()
                },
                ProductOrder::SortOrderDescNewestFirst,
            ),
            MoveDirection::Down => (
                ProductFilter {
                    sort_order_above: Some(current),
                    ..ProductFilter::default()
                },
                ProductOrder::SortOrderAscOldestFirst,
            ),
        };
        ProductQuery::new(filter, order).with_limit(1)
    }
}

impl core::fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoveDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(DomainError::validation(format!(
                "direction must be \"up\" or \"down\", got {other:?}"
            ))),
        }
    }
}

/// Position handed to a newly created product.
pub fn next_sort_order(current_max: Option<i64>) -> i64 {
    current_max.map_or(1, |max| max.saturating_add(1))
}

/// Total display order: `sort_order` ascending, newest first among equal positions.
pub fn display_order(a: &Product, b: &Product) -> core::cmp::Ordering {
    ProductOrder::Display.compare(a, b)
}

/// The two writes that exchange the positions of a product and its neighbor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SortSwap {
    pub target: ProductId,
    pub target_sort_order: i64,
    pub neighbor: ProductId,
    pub neighbor_sort_order: i64,
}

/// Plan a swap; `None` when the target already sits at the boundary.
pub fn plan_swap(target: &Product, neighbor: Option<&Product>) -> Option<SortSwap> {
    let neighbor = neighbor?;
    Some(SortSwap {
        target: target.id,
        target_sort_order: neighbor.sort_order,
        neighbor: neighbor.id,
        neighbor_sort_order: target.sort_order,
    })
}
