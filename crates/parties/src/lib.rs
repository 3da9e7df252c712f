//! Parties domain module (customers).
//!
//! Customer records as seen by order placement: identity plus the display
//! details a persistence layer hands back. Pure data, no IO.

pub mod customer;

pub use customer::{Customer, CustomerId};
