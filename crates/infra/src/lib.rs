//! Infrastructure layer: repositories and the order placement workflow.

pub mod order_workflow;
pub mod repository;


pub use order_workflow::{OrderCreationWorkflow, OrderError};
pub use repository::{
    CustomerLookup, InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductStore, OrderStore,
    ProductLookup, RepositoryError, StockUpdater,
};
