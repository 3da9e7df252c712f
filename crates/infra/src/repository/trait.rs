use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use storefront_parties::{Customer, CustomerId};
use storefront_products::{ProductAvailability, ProductId, StockAdjustment};
use storefront_sales::{NewOrder, Order};

/// Repository operation error.
///
/// These are **infrastructure errors** (storage reachability, concurrency,
/// corrupt data) as opposed to placement rejections, which are decided in
/// `storefront-sales`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Backend unreachable or failed. Transient; the caller may retry.
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// Optimistic stock check failed: stored stock moved since it was read.
    #[error("stock conflict: {0}")]
    Conflict(String),

    /// Backend returned or was given data that breaks its contract.
    #[error("invalid repository data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

/// Resolves customers by id.
#[automock]
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    /// `Ok(None)` when the customer does not exist.
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
}

/// Resolves product availability in batches.
#[automock]
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Availability for the ids that exist. May return fewer records than
    /// requested, in any order.
    async fn find_all_by_id(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductAvailability>, RepositoryError>;
}

/// Persists orders.
#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store a new order, assigning the order id, line item ids and creation
    /// time. Returns the stored order.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;
}

/// Writes stock levels.
///
/// Implementations must apply a batch atomically and only if, for every
/// adjustment, the stored stock still equals `expected_quantity`. Otherwise
/// nothing is written and `RepositoryError::Conflict` is returned.
#[automock]
#[async_trait]
pub trait StockUpdater: Send + Sync {
    async fn update_quantity(&self, adjustments: Vec<StockAdjustment>) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<S> CustomerLookup for Arc<S>
where
    S: CustomerLookup + ?Sized,
{
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        (**self).find_by_id(id).await
    }
}

#[async_trait]
impl<S> ProductLookup for Arc<S>
where
    S: ProductLookup + ?Sized,
{
    async fn find_all_by_id(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductAvailability>, RepositoryError> {
        (**self).find_all_by_id(ids).await
    }
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        (**self).create(order).await
    }
}

#[async_trait]
impl<S> StockUpdater for Arc<S>
where
    S: StockUpdater + ?Sized,
{
    async fn update_quantity(&self, adjustments: Vec<StockAdjustment>) -> Result<(), RepositoryError> {
        (**self).update_quantity(adjustments).await
    }
}
