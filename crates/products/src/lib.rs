//! Products domain module: stock availability and stock adjustments.
//!
//! Pure data and rules (no IO). The persistence layer produces
//! [`ProductAvailability`] records and consumes [`StockAdjustment`]s.

pub mod availability;
pub mod stock;

pub use availability::{ProductAvailability, ProductId, StockSnapshot};
pub use stock::StockAdjustment;
