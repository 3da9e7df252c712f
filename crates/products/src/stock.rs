use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

use crate::availability::ProductId;

/// New stock level for one product, computed from a snapshot.
///
/// `expected_quantity` is the stock value the decrement was computed from.
/// Stock writers apply the adjustment only while the stored quantity still
/// equals it (optimistic concurrency on the stock level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    pub expected_quantity: u32,
    pub new_quantity: u32,
}

impl StockAdjustment {
    /// Decrement `expected_quantity` by `ordered`.
    pub fn decrement(product_id: ProductId, expected_quantity: u32, ordered: u32) -> DomainResult<Self> {
        let new_quantity = expected_quantity.checked_sub(ordered).ok_or_else(|| {
            DomainError::invariant(format!(
                "cannot take {ordered} units of product {product_id} from a stock of {expected_quantity}"
            ))
        })?;

        Ok(Self {
            product_id,
            expected_quantity,
            new_quantity,
        })
    }

    /// Units removed from stock by this adjustment.
    pub fn taken(&self) -> u32 {
        self.expected_quantity - self.new_quantity
    }
}

impl ValueObject for StockAdjustment {}
