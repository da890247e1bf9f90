//! Records with identity.

/// A record that keeps its identity while its fields change (a product stays the same
/// product after a rename, a reorder or an image swap).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;
}
