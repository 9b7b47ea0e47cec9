//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. A price of `"12.50"` is the same price wherever it appears.

/// Marker trait for value objects.
///
/// - **Value Object**: no identity (two prices with the same text are equal)
/// - **Entity**: has identity (two stock items with the same id are the same item)
///
/// Value objects are immutable; to "change" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Price(String);
///
/// impl ValueObject for Price {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
