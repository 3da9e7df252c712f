use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{typed_id, DomainError, DomainResult, Entity, ValueObject};
use storefront_parties::{Customer, CustomerId};
use storefront_products::ProductId;

typed_id!(
    /// Sales order identifier, assigned by the order store.
    OrderId,
    "OrderId"
);

typed_id!(
    /// Order line item identifier, assigned by the order store.
    LineItemId,
    "LineItemId"
);

/// One product/quantity pair of an order request.
///
/// The quantity is always positive; zero is rejected on construction and on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequestedProduct")]
pub struct RequestedProduct {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Deserialize)]
struct RawRequestedProduct {
    product_id: ProductId,
    quantity: u32,
}

impl TryFrom<RawRequestedProduct> for RequestedProduct {
    type Error = DomainError;

    fn try_from(raw: RawRequestedProduct) -> Result<Self, Self::Error> {
        Self::new(raw.product_id, raw.quantity)
    }
}

impl RequestedProduct {
    pub fn new(product_id: ProductId, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "quantity for product {product_id} must be positive"
            )));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl ValueObject for RequestedProduct {}

/// Input of order placement: who is ordering what, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub products: Vec<RequestedProduct>,
}

impl OrderRequest {
    pub fn new(customer_id: CustomerId, products: Vec<RequestedProduct>) -> Self {
        Self {
            customer_id,
            products,
        }
    }

    /// Distinct requested product ids, in first-appearance order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut seen = HashSet::with_capacity(self.products.len());
        self.products
            .iter()
            .map(|line| line.product_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Line item handed to the order store (not yet assigned an id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price copied from the stock snapshot.
    pub price: Decimal,
}

/// Order handed to the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: Customer,
    pub line_items: Vec<NewLineItem>,
}

/// Stored order line.
///
/// The price is the product price at order time. There are no mutators: a
/// stored line never follows later price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    id: LineItemId,
    product_id: ProductId,
    quantity: u32,
    price: Decimal,
}

impl OrderLineItem {
    pub fn new(id: LineItemId, product_id: ProductId, quantity: u32, price: Decimal) -> Self {
        Self {
            id,
            product_id,
            quantity,
            price,
        }
    }

    /// Assign an id to a pending line item.
    pub fn from_new(id: LineItemId, line: NewLineItem) -> Self {
        Self::new(id, line.product_id, line.quantity, line.price)
    }

    pub fn id_typed(&self) -> LineItemId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Price times quantity. `None` if the amount does not fit a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

impl Entity for OrderLineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Stored sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: Customer,
    line_items: Vec<OrderLineItem>,
    created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: OrderId,
        customer: Customer,
        line_items: Vec<OrderLineItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer,
            line_items,
            created_at,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of the line totals. `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.total()?))
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_customer() -> Customer {
        Customer::new(CustomerId::generate(), "Test Customer").unwrap()
    }

    fn line(product_id: ProductId, quantity: u32) -> RequestedProduct {
        RequestedProduct::new(product_id, quantity).unwrap()
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = RequestedProduct::new(ProductId::generate(), 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("must be positive")));
    }

    #[test]
    fn zero_quantity_is_rejected_when_deserializing() {
        let json = serde_json::json!({
            "product_id": ProductId::generate().to_string(),
            "quantity": 0,
        });
        let res: Result<RequestedProduct, _> = serde_json::from_value(json);
        assert!(res.is_err());
    }

    #[test]
    fn request_deserializes_from_wire_shape() {
        let customer_id = CustomerId::generate();
        let p1 = ProductId::generate();
        let json = serde_json::json!({
            "customer_id": customer_id.to_string(),
            "products": [{ "product_id": p1.to_string(), "quantity": 3 }],
        });

        let req: OrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.customer_id, customer_id);
        assert_eq!(req.products, vec![line(p1, 3)]);
    }

    #[test]
    fn product_ids_are_distinct_in_first_appearance_order() {
        let p1 = ProductId::generate();
        let p2 = ProductId::generate();
        let req = OrderRequest::new(
            CustomerId::generate(),
            vec![line(p2, 1), line(p1, 1), line(p2, 4)],
        );

        assert_eq!(req.product_ids(), vec![p2, p1]);
    }

    #[test]
    fn line_item_total_is_price_times_quantity() {
        let item = OrderLineItem::new(
            LineItemId::generate(),
            ProductId::generate(),
            3,
            Decimal::new(1050, 2),
        );
        assert_eq!(item.total(), Some(Decimal::new(3150, 2)));
    }

    #[test]
    fn from_new_keeps_snapshot_fields() {
        let product_id = ProductId::generate();
        let id = LineItemId::generate();
        let item = OrderLineItem::from_new(
            id,
            NewLineItem {
                product_id,
                quantity: 2,
                price: Decimal::new(2000, 2),
            },
        );

        assert_eq!(item.id_typed(), id);
        assert_eq!(item.product_id(), product_id);
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.price(), Decimal::new(2000, 2));
    }

    #[test]
    fn order_total_sums_line_totals() {
        let order = Order::new(
            OrderId::generate(),
            test_customer(),
            vec![
                OrderLineItem::new(LineItemId::generate(), ProductId::generate(), 3, Decimal::new(1000, 2)),
                OrderLineItem::new(LineItemId::generate(), ProductId::generate(), 1, Decimal::new(2000, 2)),
            ],
            Utc::now(),
        );

        assert_eq!(order.total(), Some(Decimal::new(5000, 2)));
    }

    #[test]
    fn empty_order_totals_zero() {
        let order = Order::new(OrderId::generate(), test_customer(), vec![], Utc::now());
        assert_eq!(order.total(), Some(Decimal::ZERO));
    }

    #[test]
    fn line_total_overflow_is_none() {
        let item = OrderLineItem::new(LineItemId::generate(), ProductId::generate(), 2, Decimal::MAX);
        assert_eq!(item.total(), None);
    }

    #[test]
    fn order_total_overflow_is_none() {
        let order = Order::new(
            OrderId::generate(),
            test_customer(),
            vec![
                OrderLineItem::new(LineItemId::generate(), ProductId::generate(), 1, Decimal::MAX),
                OrderLineItem::new(LineItemId::generate(), ProductId::generate(), 1, Decimal::ONE),
            ],
            Utc::now(),
        );
        assert_eq!(order.total(), None);
    }

    #[test]
    fn product_ids_of_large_request_are_distinct_and_ordered() {
        let distinct: Vec<ProductId> = (0..50_000).map(|_| ProductId::generate()).collect();
        let lines = distinct
            .iter()
            .chain(distinct.iter().rev())
            .map(|id| line(*id, 1))
            .collect();
        let req = OrderRequest::new(CustomerId::generate(), lines);

        assert_eq!(req.product_ids(), distinct);
    }
}
