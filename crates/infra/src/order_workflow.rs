//! Order placement pipeline (application-level orchestration).
//!
//! ```text
//! OrderRequest
//!   ↓
//! 1. Customer lookup            → Rejected(CustomerNotFound)
//!   ↓
//! 2. Batch product lookup       → stock snapshot
//!   ↓
//! 3. Placement rules (pure)     → Rejected(NoProductsFound | ProductNotFound | InsufficientStock)
//!   ↓
//! 4. Persist order              → Infrastructure(..) on failure, nothing written
//!   ↓
//! 5. Stock adjustments from the snapshot, one batched write
//!                               → StockNotUpdated { order, .. } on failure
//! ```
//!
//! Rejections happen before any write. The order write and the stock write are
//! not one transaction: if the stock write fails, the order stays persisted
//! with stock not decremented and no compensation is attempted. The caller
//! gets the stored order back inside the error to reconcile.
//!
//! Concurrent placements for the same product are not serialized here. The
//! stock writer's compare-and-set on `expected_quantity` is what stops two
//! placements that validated against the same snapshot from both decrementing;
//! the loser ends in `StockNotUpdated` with `RepositoryError::Conflict`.

use thiserror::Error;

use storefront_products::StockSnapshot;
use storefront_sales::{placement, NewOrder, Order, OrderRequest, PlacementError};

use crate::repository::{CustomerLookup, OrderStore, ProductLookup, RepositoryError, StockUpdater};

#[derive(Debug, Error)]
pub enum OrderError {
    /// The request was turned down; nothing was written.
    #[error("order rejected: {0}")]
    Rejected(#[from] PlacementError),

    /// A lookup or the order write failed; no order exists.
    #[error("infrastructure failure: {0}")]
    Infrastructure(#[from] RepositoryError),

    /// The order was persisted but its stock decrement was not applied.
    #[error("order {} persisted but stock was not updated: {source}", .order.id_typed())]
    StockNotUpdated {
        order: Box<Order>,
        #[source]
        source: RepositoryError,
    },
}

impl OrderError {
    /// One of the four placement rejections.
    pub fn is_validation(&self) -> bool {
        matches!(self, OrderError::Rejected(_))
    }

    /// Safe to retry the whole placement: nothing was written and the failure
    /// was transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Infrastructure(e) if e.is_transient())
    }

    pub fn placement(&self) -> Option<&PlacementError> {
        match self {
            OrderError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Places orders against four injected collaborators.
///
/// Collaborators are plain generic parameters; wire them once at startup
/// (typically `Arc`s of the concrete stores).
#[derive(Debug, Clone)]
pub struct OrderCreationWorkflow<C, P, O, S> {
    customers: C,
    products: P,
    orders: O,
    stock: S,
}

impl<C, P, O, S> OrderCreationWorkflow<C, P, O, S> {
    pub fn new(customers: C, products: P, orders: O, stock: S) -> Self {
        Self {
            customers,
            products,
            orders,
            stock,
        }
    }
}

impl<C, P, O, S> OrderCreationWorkflow<C, P, O, S>
where
    C: CustomerLookup,
    P: ProductLookup,
    O: OrderStore,
    S: StockUpdater,
{
    /// Validate, persist and decrement stock for one order request.
    #[tracing::instrument(
        name = "order.create",
        skip_all,
        fields(customer_id = %request.customer_id, lines = request.products.len())
    )]
    pub async fn execute(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let customer = self
            .customers
            .find_by_id(&request.customer_id)
            .await
            .map_err(infrastructure("customer lookup"))?
            .ok_or(PlacementError::CustomerNotFound(request.customer_id))
            .map_err(rejected)?;

        let snapshot = if request.products.is_empty() {
            StockSnapshot::default()
        } else {
            let ids = request.product_ids();
            let records = self
                .products
                .find_all_by_id(&ids)
                .await
                .map_err(infrastructure("product lookup"))?;
            StockSnapshot::from_records(records)
        };

        let line_items = placement::price_lines(&request, &snapshot).map_err(rejected)?;

        let order = self
            .orders
            .create(NewOrder {
                customer,
                line_items,
            })
            .await
            .map_err(infrastructure("order write"))?;

        let adjustments = match placement::stock_adjustments(&snapshot, order.line_items()) {
            Ok(a) => a,
            Err(e) => {
                return Err(stock_not_updated(
                    order,
                    RepositoryError::InvalidData(e.to_string()),
                ));
            }
        };

        if let Err(e) = self.stock.update_quantity(adjustments).await {
            return Err(stock_not_updated(order, e));
        }

        tracing::info!(order_id = %order.id_typed(), "order created");
        Ok(order)
    }
}

fn rejected(err: PlacementError) -> OrderError {
    tracing::info!(reason = %err, "order rejected");
    OrderError::Rejected(err)
}

fn infrastructure(step: &'static str) -> impl Fn(RepositoryError) -> OrderError {
    move |err| {
        tracing::warn!(step, error = %err, "order placement failed");
        OrderError::Infrastructure(err)
    }
}

fn stock_not_updated(order: Order, source: RepositoryError) -> OrderError {
    tracing::error!(
        order_id = %order.id_typed(),
        error = %source,
        "order persisted but stock was not decremented"
    );
    OrderError::StockNotUpdated {
        order: Box::new(order),
        source,
    }
}
