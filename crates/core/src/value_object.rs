//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attributes. In
/// this workspace the requested product/quantity pair, the stock availability
/// snapshot and the stock adjustment are values: they are never mutated, only
/// replaced.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Quantity(u32);
///
/// impl ValueObject for Quantity {}
///
/// assert_eq!(Quantity(3), Quantity(3));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
