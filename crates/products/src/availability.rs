use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{typed_id, DomainError, DomainResult, ValueObject};

typed_id!(
    /// Product identifier.
    ProductId,
    "ProductId"
);

/// Price and available stock of one product, as read at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProductAvailability")]
pub struct ProductAvailability {
    id: ProductId,
    price: Decimal,
    quantity: u32,
}

#[derive(Deserialize)]
struct RawProductAvailability {
    id: ProductId,
    price: Decimal,
    quantity: u32,
}

impl TryFrom<RawProductAvailability> for ProductAvailability {
    type Error = DomainError;

    fn try_from(raw: RawProductAvailability) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.price, raw.quantity)
    }
}

impl ProductAvailability {
    pub fn new(id: ProductId, price: Decimal, quantity: u32) -> DomainResult<Self> {
        if price.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "price for product {id} cannot be negative"
            )));
        }

        Ok(Self { id, price, quantity })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Units currently in stock.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Same product and price at a different stock level.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            id: self.id,
            price: self.price,
            quantity,
        }
    }
}

impl ValueObject for ProductAvailability {}

/// Availability records returned by one batch lookup, indexed by product id.
///
/// Every later price or stock read during an order placement goes through the
/// snapshot; nothing is re-fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSnapshot {
    by_id: HashMap<ProductId, ProductAvailability>,
}

impl StockSnapshot {
    /// Build from lookup results. If a backend returns the same id twice the
    /// last record wins.
    pub fn from_records(records: impl IntoIterator<Item = ProductAvailability>) -> Self {
        let by_id = records.into_iter().map(|r| (r.id, r)).collect();
        Self { by_id }
    }

    pub fn get(&self, id: &ProductId) -> Option<&ProductAvailability> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
