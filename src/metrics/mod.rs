// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry};

pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Orders handled, by strategy and terminal outcome
// - End-to-end handling latency per strategy
// - Payment charge results (orchestrated flow)
// - Order event publish results (choreographed flow)
// - Circuit breaker state per downstream
//
// Scraped via GET /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_handled: IntCounterVec,
    pub order_handling_duration: HistogramVec,
    pub payment_charges: IntCounterVec,
    pub events_published: IntCounterVec,
    pub circuit_breaker_state: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_handled = IntCounterVec::new(
            Opts::new("orders_handled_total", "Total orders handled"),
            &["strategy", "outcome"],
        )?;
        registry.register(Box::new(orders_handled.clone()))?;

        let order_handling_duration = HistogramVec::new(
            HistogramOpts::new("order_handling_duration_seconds", "Order handling duration")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 10.0]),
            &["strategy"],
        )?;
        registry.register(Box::new(order_handling_duration.clone()))?;

        let payment_charges = IntCounterVec::new(
            Opts::new("payment_charges_total", "Payment charges by result"),
            &["result"],
        )?;
        registry.register(Box::new(payment_charges.clone()))?;

        let events_published = IntCounterVec::new(
            Opts::new("order_events_published_total", "Order events published by result"),
            &["result"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let circuit_breaker_state = IntGaugeVec::new(
            Opts::new(
                "circuit_breaker_state",
                "Circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
            ),
            &["breaker"],
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            orders_handled,
            order_handling_duration,
            payment_charges,
            events_published,
            circuit_breaker_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order(&self, strategy: &str, outcome: &str, duration_secs: f64) {
        self.orders_handled.with_label_values(&[strategy, outcome]).inc();
        self.order_handling_duration.with_label_values(&[strategy]).observe(duration_secs);
    }

    pub fn record_payment(&self, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.payment_charges.with_label_values(&[result]).inc();
    }

    pub fn record_publish(&self, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.events_published.with_label_values(&[result]).inc();
    }

    pub fn update_circuit_breaker_state(&self, breaker: &str, state: i64) {
        self.circuit_breaker_state.with_label_values(&[breaker]).set(state);
    }

    /// Current value of a counter series; 0 when the series does not exist.
    #[cfg(test)]
    pub fn counter_value(&self, name: &str, labels: &[&str]) -> f64 {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.name() == name)
            .flat_map(|family| family.metric.iter())
            .find(|metric| {
                labels
                    .iter()
                    .all(|wanted| metric.label.iter().any(|pair| pair.value() == *wanted))
            })
            .and_then(|metric| metric.counter.value)
            .unwrap_or(0.0)
    }
}
