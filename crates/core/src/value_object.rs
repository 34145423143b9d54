//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values. A colour entry `{ name: "Red", quantity: 3, code: "#ff0000" }`
//! is a value object; an inventory item is an entity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct SpecificationEntry {
///     title: String,
///     description: String,
/// }
///
/// impl ValueObject for SpecificationEntry {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
