//! Value object trait: equality by value, not identity.
//!
//! A price or an ordered image set has no identity of its own; two values with the
//! same contents are interchangeable.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To "modify"
/// one, build a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
