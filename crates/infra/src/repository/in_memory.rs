use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use storefront_parties::{Customer, CustomerId};
use storefront_products::{ProductAvailability, ProductId, StockAdjustment};
use storefront_sales::{LineItemId, NewOrder, Order, OrderId, OrderLineItem};

use super::r#trait::{CustomerLookup, OrderStore, ProductLookup, RepositoryError, StockUpdater};

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

/// In-memory customer directory.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a customer.
    pub fn insert(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut map = self.customers.write().map_err(|_| poisoned())?;
        map.insert(customer.id_typed(), customer);
        Ok(())
    }
}

#[async_trait]
impl CustomerLookup for InMemoryCustomerStore {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let map = self.customers.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }
}

/// In-memory product catalog with stock levels.
///
/// Stock writes are compare-and-set on the whole batch: every adjustment's
/// `expected_quantity` is checked under one write lock before any is applied.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, ProductAvailability>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product record.
    pub fn insert(&self, product: ProductAvailability) -> Result<(), RepositoryError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;
        map.insert(product.id(), product);
        Ok(())
    }

    pub fn get(&self, id: &ProductId) -> Result<Option<ProductAvailability>, RepositoryError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductStore {
    async fn find_all_by_id(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductAvailability>, RepositoryError> {
        let map = self.products.read().map_err(|_| poisoned())?;
        let mut seen = HashSet::with_capacity(ids.len());

        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| map.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl StockUpdater for InMemoryProductStore {
    async fn update_quantity(&self, adjustments: Vec<StockAdjustment>) -> Result<(), RepositoryError> {
        let mut map = self.products.write().map_err(|_| poisoned())?;

        // Validate the whole batch before touching anything.
        let mut seen = HashSet::with_capacity(adjustments.len());
        for adj in &adjustments {
            if !seen.insert(adj.product_id) {
                return Err(RepositoryError::InvalidData(format!(
                    "product {} adjusted twice in one batch",
                    adj.product_id
                )));
            }

            let current = map.get(&adj.product_id).ok_or_else(|| {
                RepositoryError::Conflict(format!("product {} no longer exists", adj.product_id))
            })?;

            if current.quantity() != adj.expected_quantity {
                return Err(RepositoryError::Conflict(format!(
                    "product {}: expected stock {}, found {}",
                    adj.product_id,
                    adj.expected_quantity,
                    current.quantity()
                )));
            }
        }

        for adj in adjustments {
            if let Some(current) = map.get_mut(&adj.product_id) {
                *current = current.with_quantity(adj.new_quantity);
            }
        }

        Ok(())
    }
}

/// In-memory order store. Keeps orders in creation order.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.iter().find(|o| o.id_typed() == *id).cloned())
    }

    pub fn list_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders
            .iter()
            .filter(|o| o.customer().id_typed() == *customer_id)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.len())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let line_items = order
            .line_items
            .into_iter()
            .map(|line| OrderLineItem::from_new(LineItemId::generate(), line))
            .collect();

        let stored = Order::new(OrderId::generate(), order.customer, line_items, Utc::now());

        let mut orders = self.orders.write().map_err(|_| poisoned())?;
        orders.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;
    use storefront_sales::NewLineItem;

    fn product(quantity: u32) -> ProductAvailability {
        ProductAvailability::new(ProductId::generate(), Decimal::new(1000, 2), quantity).unwrap()
    }

    fn customer() -> Customer {
        Customer::new(CustomerId::generate(), "Test Customer").unwrap()
    }

    #[tokio::test]
    async fn customer_lookup_returns_none_for_unknown_id() {
        let store = InMemoryCustomerStore::new();
        let known = customer();
        store.insert(known.clone()).unwrap();

        assert_eq!(store.find_by_id(&known.id_typed()).await.unwrap(), Some(known));
        assert_eq!(store.find_by_id(&CustomerId::generate()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn product_lookup_skips_unknown_and_repeated_ids() {
        let store = InMemoryProductStore::new();
        let a = product(5);
        let b = product(2);
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        let found = store
            .find_all_by_id(&[b.id(), ProductId::generate(), a.id(), b.id()])
            .await
            .unwrap();

        assert_eq!(found, vec![b, a]);
    }

    #[tokio::test]
    async fn stock_update_applies_whole_batch() {
        let store = InMemoryProductStore::new();
        let a = product(5);
        let b = product(2);
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        store
            .update_quantity(vec![
                StockAdjustment::decrement(a.id(), 5, 3).unwrap(),
                StockAdjustment::decrement(b.id(), 2, 1).unwrap(),
            ])
            .await
            .unwrap();

        assert_eq!(store.get(&a.id()).unwrap().unwrap().quantity(), 2);
        assert_eq!(store.get(&b.id()).unwrap().unwrap().quantity(), 1);
        // Price untouched by stock writes.
        assert_eq!(store.get(&a.id()).unwrap().unwrap().price(), a.price());
    }

    #[tokio::test]
    async fn stale_adjustment_rejects_whole_batch() {
        let store = InMemoryProductStore::new();
        let a = product(5);
        let b = product(2);
        store.insert(a.clone()).unwrap();
        store.insert(b.clone()).unwrap();

        let err = store
            .update_quantity(vec![
                StockAdjustment::decrement(a.id(), 5, 3).unwrap(),
                // Stale: computed from a stock of 4, store holds 2.
                StockAdjustment::decrement(b.id(), 4, 1).unwrap(),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.get(&a.id()).unwrap().unwrap().quantity(), 5);
        assert_eq!(store.get(&b.id()).unwrap().unwrap().quantity(), 2);
    }

    #[tokio::test]
    async fn adjusting_unknown_product_is_a_conflict() {
        let store = InMemoryProductStore::new();
        let err = store
            .update_quantity(vec![StockAdjustment::decrement(ProductId::generate(), 1, 1).unwrap()])
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(msg) if msg.contains("no longer exists")));
    }

    #[tokio::test]
    async fn duplicate_adjustments_are_invalid() {
        let store = InMemoryProductStore::new();
        let a = product(5);
        store.insert(a.clone()).unwrap();

        let adj = StockAdjustment::decrement(a.id(), 5, 1).unwrap();
        let err = store.update_quantity(vec![adj, adj]).await.unwrap_err();

        assert!(matches!(err, RepositoryError::InvalidData(_)));
        assert_eq!(store.get(&a.id()).unwrap().unwrap().quantity(), 5);
    }

    #[tokio::test]
    async fn order_store_assigns_ids_and_keeps_lines() {
        let store = InMemoryOrderStore::new();
        let buyer = customer();
        let product_id = ProductId::generate();

        let order = store
            .create(NewOrder {
                customer: buyer.clone(),
                line_items: vec![
                    NewLineItem { product_id, quantity: 3, price: Decimal::new(1000, 2) },
                    NewLineItem { product_id, quantity: 1, price: Decimal::new(1000, 2) },
                ],
            })
            .await
            .unwrap();

        assert_eq!(order.customer(), &buyer);
        assert_eq!(order.line_items().len(), 2);
        assert_ne!(order.line_items()[0].id_typed(), order.line_items()[1].id_typed());
        assert_eq!(order.line_items()[0].quantity(), 3);

        assert_eq!(store.get(&order.id_typed()).unwrap(), Some(order.clone()));
        assert_eq!(store.list_for_customer(&buyer.id_typed()).unwrap(), vec![order]);
        assert!(store.list_for_customer(&CustomerId::generate()).unwrap().is_empty());
        assert_eq!(store.len().unwrap(), 1);
    }
}
