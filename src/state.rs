use std::sync::Arc;

use crate::distance::DistanceProvider;
use crate::observability::metrics::Metrics;
use crate::service::OrderService;
use crate::store::OrderStore;

pub struct AppState {
    pub orders: OrderService,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, distance: Arc<dyn DistanceProvider>) -> Self {
        let metrics = Metrics::new();

        Self {
            orders: OrderService::new(store, distance, metrics.clone()),
            metrics,
        }
    }
}
