//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Customers, orders and order line items are entities: two records with the
/// same identifier are the same thing, whatever their other fields say.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
