use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_created_total: IntCounter,
    pub bids_placed_total: IntCounter,
    pub accepts_total: IntCounterVec,
    pub accept_latency_seconds: HistogramVec,
    pub status_transitions_total: IntCounterVec,
    pub open_deliveries: IntGauge,
    pub location_samples_total: IntCounter,
    pub tracking_subscribers: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_created_total = IntCounter::new(
            "deliveries_created_total",
            "Total delivery requests created",
        )
        .expect("valid deliveries_created_total metric");

        let bids_placed_total = IntCounter::new("bids_placed_total", "Total bids placed")
            .expect("valid bids_placed_total metric");

        let accepts_total = IntCounterVec::new(
            Opts::new("accepts_total", "Bid acceptance attempts by outcome"),
            &["outcome"],
        )
        .expect("valid accepts_total metric");

        let accept_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "accept_latency_seconds",
                "Latency of the bid acceptance transaction in seconds",
            ),
            &["outcome"],
        )
        .expect("valid accept_latency_seconds metric");

        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "status_transitions_total",
                "Delivery status transitions by target status",
            ),
            &["to"],
        )
        .expect("valid status_transitions_total metric");

        let open_deliveries = IntGauge::new(
            "open_deliveries",
            "Deliveries currently open for bidding",
        )
        .expect("valid open_deliveries metric");

        let location_samples_total = IntCounter::new(
            "location_samples_total",
            "Courier location samples accepted for publication",
        )
        .expect("valid location_samples_total metric");

        let tracking_subscribers = IntGauge::new(
            "tracking_subscribers",
            "Currently connected tracking subscribers",
        )
        .expect("valid tracking_subscribers metric");

        registry
            .register(Box::new(deliveries_created_total.clone()))
            .expect("register deliveries_created_total");
        registry
            .register(Box::new(bids_placed_total.clone()))
            .expect("register bids_placed_total");
        registry
            .register(Box::new(accepts_total.clone()))
            .expect("register accepts_total");
        registry
            .register(Box::new(accept_latency_seconds.clone()))
            .expect("register accept_latency_seconds");
        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register status_transitions_total");
        registry
            .register(Box::new(open_deliveries.clone()))
            .expect("register open_deliveries");
        registry
            .register(Box::new(location_samples_total.clone()))
            .expect("register location_samples_total");
        registry
            .register(Box::new(tracking_subscribers.clone()))
            .expect("register tracking_subscribers");

        Self {
            registry,
            deliveries_created_total,
            bids_placed_total,
            accepts_total,
            accept_latency_seconds,
            status_transitions_total,
            open_deliveries,
            location_samples_total,
            tracking_subscribers,
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

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
