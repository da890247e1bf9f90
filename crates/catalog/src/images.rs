//! Bounded, ordered product image sets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use colourmagic_core::ValueObject;

/// Maximum number of images a product may carry.
pub const MAX_IMAGES: usize = 8;

/// Ordered list of image URLs; the first entry is the cover image.
///
/// Invariant: no duplicates and never more than [`MAX_IMAGES`] entries.
/// Deserializing goes through [`ImageSet::from_urls`], so the invariant holds for decoded
/// values too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ImageSet(Vec<String>);

impl ValueObject for ImageSet {}

impl From<Vec<String>> for ImageSet {
    fn from(urls: Vec<String>) -> Self {
        Self::from_urls(urls)
    }
}

impl From<ImageSet> for Vec<String> {
    fn from(set: ImageSet) -> Self {
        set.0
    }
}

impl ImageSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a set from arbitrary URLs: dedupe by first occurrence, then truncate.
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut urls = dedupe_preserving_order(urls);
        urls.truncate(MAX_IMAGES);
        Self(urls)
    }

    /// `kept ++ uploaded`, deduped and capped.
    pub fn merge(kept: Vec<String>, uploaded: Vec<String>) -> Self {
        Self::from_urls(kept.into_iter().chain(uploaded))
    }

    pub fn cover(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn dedupe_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
