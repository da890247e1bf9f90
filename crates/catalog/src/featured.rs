//! Featured-product capacity rule.

use colourmagic_core::{DomainError, DomainResult};

/// Maximum number of products that may be featured at the same time.
pub const MAX_FEATURED: usize = 12;

/// Check that one more product can be featured given the current featured count.
pub fn ensure_featured_capacity(currently_featured: usize) -> DomainResult<()> {
    if currently_featured >= MAX_FEATURED {
        return Err(DomainError::capacity_exceeded("featured products", MAX_FEATURED));
    }
    Ok(())
}
