use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::store::{OrderStore, StoreError};

/// In-process store. The claim is decided while holding the entry's write
/// guard, so concurrent transitions on one id are serialized.
#[derive(Debug)]
pub struct MemoryOrderStore {
    orders: DashMap<i64, Order>,
    next_id: AtomicI64,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id,
            distance: order.distance,
            status: order.status,
        };

        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|order| order.id);

        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(orders.into_iter().skip(offset).take(limit).collect())
    }

    async fn transition(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        let Some(mut order) = self.orders.get_mut(&id) else {
            return Ok(false);
        };

        if order.status != from {
            return Ok(false);
        }

        order.status = to;
        Ok(true)
    }
}
