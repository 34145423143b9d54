//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// An item keeps its identity while its fields are overwritten by edits;
/// list operations match on `id()`, never on field values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
