use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub order_claims_total: IntCounterVec,
    pub distance_lookup_seconds: HistogramVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")
                .expect("valid orders_created_total metric");

        let order_claims_total = IntCounterVec::new(
            Opts::new("order_claims_total", "Total claim attempts by outcome"),
            &["outcome"],
        )
        .expect("valid order_claims_total metric");

        let distance_lookup_seconds = HistogramVec::new(
            HistogramOpts::new(
                "distance_lookup_seconds",
                "Latency of distance provider lookups in seconds",
            ),
            &["outcome"],
        )
        .expect("valid distance_lookup_seconds metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(order_claims_total.clone()))
            .expect("register order_claims_total");
        registry
            .register(Box::new(distance_lookup_seconds.clone()))
            .expect("register distance_lookup_seconds");

        Self {
            registry,
            orders_created_total,
            order_claims_total,
            distance_lookup_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
