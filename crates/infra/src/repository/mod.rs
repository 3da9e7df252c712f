//! Repository abstractions used by order placement, plus in-memory backends.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductStore};
pub use r#trait::{
    CustomerLookup, MockCustomerLookup, MockOrderStore, MockProductLookup, MockStockUpdater,
    OrderStore, ProductLookup, RepositoryError, StockUpdater,
};
