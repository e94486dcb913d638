//! PostgreSQL-backed order store.
//!
//! Claims use a single conditional `UPDATE` so the database decides the
//! winner when several service instances race on the same order.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::config::DbConfig;
use crate::models::order::{NewOrder, Order, OrderStatus};
use crate::store::{OrderStore, StoreError};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&config.hostname)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.schema);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Creates the `orders` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id BIGSERIAL PRIMARY KEY,
                distance BIGINT NOT NULL CHECK (distance >= 0),
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<Order, StoreError> {
        let id: i64 = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let status = status.parse::<OrderStatus>().map_err(|err| StoreError::Corrupt {
            id,
            reason: err.to_string(),
        })?;

        Ok(Order {
            id,
            distance: row.try_get("distance")?,
            status,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders (distance, status) VALUES ($1, $2) RETURNING id",
        )
        .bind(order.distance)
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Order {
            id,
            distance: order.distance,
            status: order.status,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT id, distance, status FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, distance, status FROM orders ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn transition(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::postgres::PgPoolOptions;

    use super::PgOrderStore;
    use crate::models::order::{NewOrder, OrderStatus};
    use crate::store::OrderStore;

    async fn store_from_env() -> PgOrderStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect(&url)
            .await
            .unwrap();

        let store = PgOrderStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    #[ignore = "requires a running postgres at DATABASE_URL"]
    async fn concurrent_transitions_have_one_winner() {
        let store = Arc::new(store_from_env().await);
        let id = store.create(&NewOrder::unassigned(250)).await.unwrap().id;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .transition(id, OrderStatus::Unassigned, OrderStatus::Taken)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        let stored = store.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Taken);
        assert_eq!(stored.distance, 250);
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at DATABASE_URL"]
    async fn transition_on_missing_id_changes_nothing() {
        let store = store_from_env().await;

        let changed = store
            .transition(i64::MAX, OrderStatus::Unassigned, OrderStatus::Taken)
            .await
            .unwrap();

        assert!(!changed);
    }
}
