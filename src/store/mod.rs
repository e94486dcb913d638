pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::order::{NewOrder, Order, OrderStatus};

pub use memory::MemoryOrderStore;
pub use postgres::PgOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Persistent record keeper for orders and the sole arbiter of claim races.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order and returns it with its assigned id.
    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// Returns at most `limit` orders after skipping `offset`, in id order.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Order>, StoreError>;

    /// Atomically sets `status = to` only where the record currently has
    /// `status = from`. Returns whether a record was changed.
    async fn transition(&self, id: i64, from: OrderStatus, to: OrderStatus)
    -> Result<bool, StoreError>;
}
