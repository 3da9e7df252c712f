//! Order placement rules.
//!
//! Pure functions over an [`OrderRequest`] and the [`StockSnapshot`] read for
//! it. The caller does the IO (customer lookup, product lookup, order write,
//! stock write) and calls into this module between the reads and the writes.

use std::collections::HashMap;

use thiserror::Error;

use storefront_core::{DomainError, DomainResult};
use storefront_parties::CustomerId;
use storefront_products::{ProductId, StockAdjustment, StockSnapshot};

use crate::order::{NewLineItem, OrderLineItem, OrderRequest};

/// Reasons an order request is turned down before anything is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("customer {0} does not exist")]
    CustomerNotFound(CustomerId),

    #[error("could not find any products with the given ids")]
    NoProductsFound,

    #[error("could not find product {0}")]
    ProductNotFound(ProductId),

    #[error("the quantity {requested} is not available for product {product_id}")]
    InsufficientStock { product_id: ProductId, requested: u64 },
}

/// Validate a request against its stock snapshot and price its lines.
///
/// Checks run in this order, each reporting the first offending line in
/// request order:
///
/// 1. the snapshot is empty → [`PlacementError::NoProductsFound`]
/// 2. a requested id is missing from the snapshot → [`PlacementError::ProductNotFound`]
/// 3. a line asks for more than is in stock → [`PlacementError::InsufficientStock`]
///
/// When a product is requested on several lines, step 3 compares the running
/// total for that product, and the error reports that running total.
///
/// On success every line gets the snapshot price of its product.
pub fn price_lines(
    request: &OrderRequest,
    snapshot: &StockSnapshot,
) -> Result<Vec<NewLineItem>, PlacementError> {
    if request.products.is_empty() || snapshot.is_empty() {
        return Err(PlacementError::NoProductsFound);
    }

    if let Some(missing) = request
        .products
        .iter()
        .find(|line| !snapshot.contains(&line.product_id()))
    {
        return Err(PlacementError::ProductNotFound(missing.product_id()));
    }

    let mut requested_so_far: HashMap<ProductId, u64> = HashMap::new();
    let mut priced = Vec::with_capacity(request.products.len());

    for line in &request.products {
        let product_id = line.product_id();
        let Some(available) = snapshot.get(&product_id) else {
            return Err(PlacementError::ProductNotFound(product_id));
        };

        let running = requested_so_far.entry(product_id).or_insert(0);
        *running += u64::from(line.quantity());

        if *running > u64::from(available.quantity()) {
            return Err(PlacementError::InsufficientStock {
                product_id,
                requested: *running,
            });
        }

        priced.push(NewLineItem {
            product_id,
            quantity: line.quantity(),
            price: available.price(),
        });
    }

    Ok(priced)
}

/// Post-order stock levels for the stored line items.
///
/// One adjustment per distinct product, in first-appearance order, computed
/// from the snapshot read before the order was written (never a fresh read).
/// A stored line whose product is not in the snapshot, or whose quantities
/// exceed the snapshot stock, means the order store returned something other
/// than what it was given.
pub fn stock_adjustments(
    snapshot: &StockSnapshot,
    line_items: &[OrderLineItem],
) -> DomainResult<Vec<StockAdjustment>> {
    let mut order: Vec<ProductId> = Vec::new();
    let mut taken: HashMap<ProductId, u32> = HashMap::new();

    for item in line_items {
        let product_id = item.product_id();
        let total = taken.entry(product_id).or_insert_with(|| {
            order.push(product_id);
            0
        });
        *total = total.checked_add(item.quantity()).ok_or_else(|| {
            DomainError::invariant(format!("ordered quantity of product {product_id} overflows"))
        })?;
    }

    order
        .into_iter()
        .map(|product_id| {
            let available = snapshot.get(&product_id).ok_or_else(|| {
                DomainError::invariant(format!(
                    "stored line item references product {product_id} missing from the stock snapshot"
                ))
            })?;
            let ordered = taken.get(&product_id).copied().unwrap_or(0);
            StockAdjustment::decrement(product_id, available.quantity(), ordered)
        })
        .collect()
}
