use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::distance::{DistanceError, DistanceProvider};
use crate::error::AppError;
use crate::models::order::{Coordinates, NewOrder, Order, OrderStatus};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

/// Owns the order lifecycle: creation via the distance provider and the
/// `UNASSIGNED -> TAKEN` claim.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    distance: Arc<dyn DistanceProvider>,
    metrics: Metrics,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        distance: Arc<dyn DistanceProvider>,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            distance,
            metrics,
        }
    }

    pub async fn create_order(
        &self,
        origin: &Coordinates,
        destination: &Coordinates,
    ) -> Result<Order, AppError> {
        let start = Instant::now();
        let lookup = self.distance.distance_meters(origin, destination).await;
        let outcome = match &lookup {
            Ok(_) => "ok",
            Err(DistanceError::Unknown) => "unknown",
            Err(_) => "error",
        };
        self.metrics
            .distance_lookup_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        let distance = lookup.inspect_err(|err| {
            if matches!(err, DistanceError::Unknown) {
                debug!(%origin, %destination, "no route between points");
            }
        })?;

        let order = self.store.create(&NewOrder::unassigned(distance)).await?;
        self.metrics.orders_created_total.inc();

        info!(order_id = order.id, distance = order.distance, "order created");
        Ok(order)
    }

    pub async fn get_orders(&self, page: u32, limit: u32) -> Result<Vec<Order>, AppError> {
        let offset = i64::try_from(u64::from(page) * u64::from(limit)).unwrap_or(i64::MAX);
        let orders = self.store.list(offset, i64::from(limit)).await?;
        Ok(orders)
    }

    /// Claims an unassigned order. The read only answers "does it exist";
    /// the conditional write decides between success and already taken.
    pub async fn take_order(&self, id: i64) -> Result<(), AppError> {
        let result = self.try_take(id).await;

        let outcome = match &result {
            Ok(()) => "success",
            Err(AppError::AlreadyTaken) => "already_taken",
            Err(AppError::NotFound) => "not_found",
            Err(_) => "error",
        };
        self.metrics
            .order_claims_total
            .with_label_values(&[outcome])
            .inc();

        result
    }

    async fn try_take(&self, id: i64) -> Result<(), AppError> {
        let order = self.store.get(id).await?.ok_or(AppError::NotFound)?;

        if !order.status.can_transition_to(OrderStatus::Taken) {
            return Err(AppError::AlreadyTaken);
        }

        let changed = self
            .store
            .transition(id, OrderStatus::Unassigned, OrderStatus::Taken)
            .await?;

        if !changed {
            return Err(AppError::AlreadyTaken);
        }

        info!(order_id = id, "order taken");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::OrderService;
    use crate::distance::FixedDistance;
    use crate::error::AppError;
    use crate::models::order::{Coordinates, NewOrder, OrderStatus};
    use crate::observability::metrics::Metrics;
    use crate::store::{MemoryOrderStore, OrderStore};

    fn origin() -> Coordinates {
        Coordinates {
            lat: 35.99,
            lng: -115.14,
        }
    }

    fn destination() -> Coordinates {
        Coordinates {
            lat: 36.02,
            lng: -115.10,
        }
    }

    fn service(store: Arc<MemoryOrderStore>, distance: Arc<FixedDistance>) -> OrderService {
        OrderService::new(store, distance, Metrics::new())
    }

    #[tokio::test]
    async fn create_persists_unassigned_order_with_provider_distance() {
        let store = Arc::new(MemoryOrderStore::new());
        let distance = Arc::new(FixedDistance::meters(4200));
        let svc = service(store.clone(), distance.clone());

        let order = svc.create_order(&origin(), &destination()).await.unwrap();

        assert_eq!(order.distance, 4200);
        assert_eq!(order.status, OrderStatus::Unassigned);
        assert_eq!(store.get(order.id).await.unwrap(), Some(order));
        assert_eq!(distance.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_distance_creates_nothing() {
        let store = Arc::new(MemoryOrderStore::new());
        let svc = service(store.clone(), Arc::new(FixedDistance::unknown()));

        let err = svc.create_order(&origin(), &destination()).await.unwrap_err();

        assert!(matches!(err, AppError::DistanceUnknown));
        assert!(store.list(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_creates_nothing() {
        let store = Arc::new(MemoryOrderStore::new());
        let svc = service(store.clone(), Arc::new(FixedDistance::failing("dns")));

        let err = svc.create_order(&origin(), &destination()).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert!(store.list(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_orders_pages_by_page_times_limit() {
        let store = Arc::new(MemoryOrderStore::new());
        let svc = service(store.clone(), Arc::new(FixedDistance::meters(10)));
        for _ in 0..5 {
            svc.create_order(&origin(), &destination()).await.unwrap();
        }

        let ids: Vec<i64> = svc
            .get_orders(1, 2)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);

        assert!(svc.get_orders(0, 0).await.unwrap().is_empty());
        assert!(svc.get_orders(9, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_orders_with_huge_page_and_limit_is_empty() {
        let store = Arc::new(MemoryOrderStore::new());
        let svc = service(store.clone(), Arc::new(FixedDistance::meters(10)));
        svc.create_order(&origin(), &destination()).await.unwrap();

        let orders = svc.get_orders(u32::MAX, u32::MAX).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn take_missing_order_is_not_found() {
        let svc = service(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(FixedDistance::meters(1)),
        );

        assert!(matches!(
            svc.take_order(99).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn taken_order_stays_taken() {
        let store = Arc::new(MemoryOrderStore::new());
        let order = store.create(&NewOrder::unassigned(500)).await.unwrap();
        let svc = service(store.clone(), Arc::new(FixedDistance::meters(1)));

        svc.take_order(order.id).await.unwrap();
        for _ in 0..3 {
            assert!(matches!(
                svc.take_order(order.id).await.unwrap_err(),
                AppError::AlreadyTaken
            ));
        }

        let stored = store.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Taken);
        assert_eq!(stored.distance, 500);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_claims_have_exactly_one_success() {
        for n in [1usize, 2, 16, 64] {
            let store = Arc::new(MemoryOrderStore::new());
            let id = store.create(&NewOrder::unassigned(10)).await.unwrap().id;
            let svc = service(store.clone(), Arc::new(FixedDistance::meters(1)));

            let handles: Vec<_> = (0..n)
                .map(|_| {
                    let svc = svc.clone();
                    tokio::spawn(async move { svc.take_order(id).await })
                })
                .collect();

            let mut successes = 0;
            let mut already_taken = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(()) => successes += 1,
                    Err(AppError::AlreadyTaken) => already_taken += 1,
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }

            assert_eq!(successes, 1, "n = {n}");
            assert_eq!(already_taken, n - 1, "n = {n}");
        }
    }
}
