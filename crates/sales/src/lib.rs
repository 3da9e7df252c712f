//! Sales orders domain module.
//!
//! This crate contains the order data model and the placement rules
//! (validation, pricing, stock decrement computation), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod order;
pub mod placement;

pub use order::{
    LineItemId, NewLineItem, NewOrder, Order, OrderId, OrderLineItem, OrderRequest,
    RequestedProduct,
};
pub use placement::{price_lines, stock_adjustments, PlacementError};
