use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::processor::OrderProcessor;
use super::value_objects::{CoordinationStrategy, Order, ProcessingResult};
use crate::actors::EventDispatcher;
use crate::messaging::PublishError;
use crate::metrics::Metrics;
use crate::payment::PaymentGateway;

// ============================================================================
// Order Coordinator
// ============================================================================
//
// Drives one order through local processing and the downstream path picked
// by the strategy:
//
//   Received → Identified → Terminal          (Simple)
//                         → Merged | BaseOnly (Orchestrated)
//                         → PublishAttempted  (Choreographed)
//
// Every path ends after one pass. The coordinator holds no per-order state
// and is cloned freely across request handlers.
//
// ============================================================================

/// Terminal state of a handled order, carrying the caller's result.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinationOutcome {
    /// Simple strategy: the base result only.
    Terminal(ProcessingResult),

    /// Payment reported OK; its message is merged after the order id.
    Merged(ProcessingResult),

    /// Payment did not report OK. The order is still placed and the caller
    /// still gets the unmerged base result.
    BaseOnly { result: ProcessingResult, reason: String },

    /// Choreographed strategy. `dispatched` is false when the event never
    /// reached the publisher; the caller's result is unaffected either way.
    PublishAttempted { result: ProcessingResult, dispatched: bool },
}

impl CoordinationOutcome {
    pub fn result(&self) -> &ProcessingResult {
        match self {
            CoordinationOutcome::Terminal(result)
            | CoordinationOutcome::Merged(result)
            | CoordinationOutcome::BaseOnly { result, .. }
            | CoordinationOutcome::PublishAttempted { result, .. } => result,
        }
    }

    pub fn into_result(self) -> ProcessingResult {
        match self {
            CoordinationOutcome::Terminal(result)
            | CoordinationOutcome::Merged(result)
            | CoordinationOutcome::BaseOnly { result, .. }
            | CoordinationOutcome::PublishAttempted { result, .. } => result,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoordinationOutcome::Terminal(_) => "terminal",
            CoordinationOutcome::Merged(_) => "merged",
            CoordinationOutcome::BaseOnly { .. } => "base_only",
            CoordinationOutcome::PublishAttempted { dispatched: true, .. } => "published",
            CoordinationOutcome::PublishAttempted { dispatched: false, .. } => "publish_failed",
        }
    }
}

#[derive(Clone)]
pub struct OrderCoordinator {
    processor: OrderProcessor,
    payments: Arc<dyn PaymentGateway>,
    events: EventDispatcher,
    metrics: Arc<Metrics>,
}

impl OrderCoordinator {
    pub fn new(
        processor: OrderProcessor,
        payments: Arc<dyn PaymentGateway>,
        events: EventDispatcher,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            processor,
            payments,
            events,
            metrics,
        }
    }

    pub async fn handle(
        &self,
        mut order: Order,
        strategy: CoordinationStrategy,
        cancel: &CancellationToken,
    ) -> CoordinationOutcome {
        let started = Instant::now();

        let order_id = self.processor.process(&mut order, cancel).await;
        let base = ProcessingResult::for_order(order_id);

        let outcome = match strategy {
            CoordinationStrategy::Simple => CoordinationOutcome::Terminal(base),
            CoordinationStrategy::Orchestrated => self.settle_payment(&order, order_id, base).await,
            CoordinationStrategy::Choreographed => self.announce(&order, order_id, base).await,
        };

        tracing::info!(
            order_id = %order_id,
            strategy = %strategy,
            outcome = outcome.label(),
            result = %outcome.result().message,
            "Order handled"
        );
        self.metrics
            .record_order(strategy.as_str(), outcome.label(), started.elapsed().as_secs_f64());

        outcome
    }

    async fn settle_payment(&self, order: &Order, order_id: Uuid, base: ProcessingResult) -> CoordinationOutcome {
        match self.payments.charge(order).await {
            Ok(payment) => {
                self.metrics.record_payment(true);
                CoordinationOutcome::Merged(base.merged_with(&payment))
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order_id,
                    error = %e,
                    "Payment not confirmed; returning order result without payment"
                );
                self.metrics.record_payment(false);
                CoordinationOutcome::BaseOnly {
                    result: base,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn announce(&self, order: &Order, order_id: Uuid, base: ProcessingResult) -> CoordinationOutcome {
        let dispatched = match self.enqueue_event(order, order_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Order event not dispatched");
                self.metrics.record_publish(false);
                false
            }
        };

        CoordinationOutcome::PublishAttempted { result: base, dispatched }
    }

    async fn enqueue_event(&self, order: &Order, order_id: Uuid) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(order)?;
        self.events.dispatch(order_id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::RecordingPublisher;
    use crate::payment::PaymentError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum StubBehaviour {
        Ok(&'static str),
        Rejected(u16),
        Unreachable,
    }

    struct StubPaymentGateway {
        behaviour: StubBehaviour,
        calls: AtomicUsize,
    }

    impl StubPaymentGateway {
        fn new(behaviour: StubBehaviour) -> Self {
            Self {
                behaviour,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for StubPaymentGateway {
        async fn charge(&self, order: &Order) -> Result<ProcessingResult, PaymentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(order.id.is_some(), "payment must see the processed order");
            match self.behaviour {
                StubBehaviour::Ok(message) => Ok(ProcessingResult::new(message)),
                StubBehaviour::Rejected(status) => Err(PaymentError::Rejected { status }),
                StubBehaviour::Unreachable => Err(PaymentError::Transport("connection refused".to_string())),
            }
        }
    }

    struct Harness {
        coordinator: OrderCoordinator,
        payments: Arc<StubPaymentGateway>,
        publisher: Arc<RecordingPublisher>,
        metrics: Arc<Metrics>,
    }

    fn harness(behaviour: StubBehaviour) -> Harness {
        let payments = Arc::new(StubPaymentGateway::new(behaviour));
        let publisher = Arc::new(RecordingPublisher::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let events = EventDispatcher::spawn(publisher.clone(), metrics.clone());
        let coordinator = OrderCoordinator::new(
            OrderProcessor::new(Duration::from_millis(5)),
            payments.clone(),
            events,
            metrics.clone(),
        );

        Harness {
            coordinator,
            payments,
            publisher,
            metrics,
        }
    }

    fn sample_order() -> Order {
        Order::new("Ana", "4111111111111111", vec!["book".to_string(), "pen".to_string()])
    }

    #[tokio::test]
    async fn test_simple_returns_fresh_id() {
        let h = harness(StubBehaviour::Ok("PAID-123"));
        let supplied = Uuid::new_v4();
        let mut order = sample_order();
        order.id = Some(supplied);

        let outcome = h
            .coordinator
            .handle(order, CoordinationStrategy::Simple, &CancellationToken::new())
            .await;

        let id: Uuid = outcome.result().message.parse().unwrap();
        assert_ne!(id, supplied);
        assert!(matches!(outcome, CoordinationOutcome::Terminal(_)));
        assert_eq!(h.payments.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.publisher.count(), 0);
    }

    #[tokio::test]
    async fn test_identical_orders_get_distinct_ids() {
        let h = harness(StubBehaviour::Ok("PAID-123"));
        let cancel = CancellationToken::new();

        let first = h.coordinator.handle(sample_order(), CoordinationStrategy::Simple, &cancel).await;
        let second = h.coordinator.handle(sample_order(), CoordinationStrategy::Simple, &cancel).await;

        assert_ne!(first.result().message, second.result().message);
    }

    #[tokio::test]
    async fn test_orchestrated_merges_payment_message() {
        let h = harness(StubBehaviour::Ok("PAID-123"));

        let outcome = h
            .coordinator
            .handle(sample_order(), CoordinationStrategy::Orchestrated, &CancellationToken::new())
            .await;

        let message = &outcome.result().message;
        let (id, payment) = message.split_once('|').unwrap();
        assert!(id.parse::<Uuid>().is_ok());
        assert_eq!(payment, "PAID-123");
        assert_eq!(message.matches('|').count(), 1);
        assert!(matches!(outcome, CoordinationOutcome::Merged(_)));
        assert_eq!(h.payments.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.metrics.counter_value("payment_charges_total", &["ok"]), 1.0);
    }

    #[tokio::test]
    async fn test_orchestrated_rejection_returns_base_only() {
        let h = harness(StubBehaviour::Rejected(500));

        let outcome = h
            .coordinator
            .handle(sample_order(), CoordinationStrategy::Orchestrated, &CancellationToken::new())
            .await;

        match &outcome {
            CoordinationOutcome::BaseOnly { result, reason } => {
                assert!(!result.message.contains('|'));
                assert!(result.message.parse::<Uuid>().is_ok());
                assert!(reason.contains("500"));
            }
            other => panic!("expected BaseOnly, got {:?}", other),
        }
        assert_eq!(h.metrics.counter_value("payment_charges_total", &["error"]), 1.0);
        assert_eq!(
            h.metrics.counter_value("orders_handled_total", &["orchestrated", "base_only"]),
            1.0
        );
    }

    #[tokio::test]
    async fn test_orchestrated_transport_failure_returns_base_only() {
        let h = harness(StubBehaviour::Unreachable);

        let outcome = h
            .coordinator
            .handle(sample_order(), CoordinationStrategy::Orchestrated, &CancellationToken::new())
            .await;

        assert_eq!(outcome.label(), "base_only");
        assert!(outcome.into_result().message.parse::<Uuid>().is_ok());
    }

    #[tokio::test]
    async fn test_choreographed_publishes_processed_order_once() {
        let h = harness(StubBehaviour::Ok("PAID-123"));
        let before = chrono::Utc::now();

        let outcome = h
            .coordinator
            .handle(sample_order(), CoordinationStrategy::Choreographed, &CancellationToken::new())
            .await;
        let after = chrono::Utc::now();

        assert!(matches!(outcome, CoordinationOutcome::PublishAttempted { dispatched: true, .. }));
        h.publisher.wait_for(1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.publisher.count(), 1);

        let events = h.publisher.events.lock().unwrap();
        let (key, payload) = &events[0];
        let event: serde_json::Value = serde_json::from_slice(payload).unwrap();

        assert_eq!(key, &outcome.result().message);
        assert_eq!(event["id"], serde_json::json!(outcome.result().message));
        assert_eq!(event["nomeCliente"], "Ana");
        assert_eq!(event["itens"], serde_json::json!(["book", "pen"]));

        let stamped = event["dataPedido"].as_i64().unwrap();
        assert!(stamped >= before.timestamp_millis());
        assert!(stamped <= after.timestamp_millis());
        assert_eq!(h.payments.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_choreographed_does_not_wait_for_publish() {
        let payments = Arc::new(StubPaymentGateway::new(StubBehaviour::Ok("unused")));
        let publisher = Arc::new(RecordingPublisher::slow(Duration::from_secs(2)));
        let metrics = Arc::new(Metrics::new().unwrap());
        let coordinator = OrderCoordinator::new(
            OrderProcessor::new(Duration::from_millis(5)),
            payments,
            EventDispatcher::spawn(publisher.clone(), metrics.clone()),
            metrics,
        );

        let started = Instant::now();
        let outcome = coordinator
            .handle(sample_order(), CoordinationStrategy::Choreographed, &CancellationToken::new())
            .await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(publisher.count(), 0);
        assert!(outcome.result().message.parse::<Uuid>().is_ok());
    }

    #[tokio::test]
    async fn test_choreographed_publish_failure_is_not_surfaced() {
        let payments = Arc::new(StubPaymentGateway::new(StubBehaviour::Ok("unused")));
        let publisher = Arc::new(RecordingPublisher::failing());
        let metrics = Arc::new(Metrics::new().unwrap());
        let coordinator = OrderCoordinator::new(
            OrderProcessor::new(Duration::from_millis(5)),
            payments,
            EventDispatcher::spawn(publisher.clone(), metrics.clone()),
            metrics,
        );

        let outcome = coordinator
            .handle(sample_order(), CoordinationStrategy::Choreographed, &CancellationToken::new())
            .await;
        publisher.wait_for(1).await;

        let message = outcome.into_result().message;
        assert!(message.parse::<Uuid>().is_ok());
        assert!(!message.contains('|'));
    }

    #[tokio::test]
    async fn test_backed_up_publisher_does_not_slow_requests() {
        let payments = Arc::new(StubPaymentGateway::new(StubBehaviour::Ok("unused")));
        let publisher = Arc::new(RecordingPublisher::slow(Duration::from_millis(300)));
        let metrics = Arc::new(Metrics::new().unwrap());
        let coordinator = OrderCoordinator::new(
            OrderProcessor::new(Duration::ZERO),
            payments,
            EventDispatcher::spawn(publisher.clone(), metrics.clone()),
            metrics,
        );
        let cancel = CancellationToken::new();

        let mut slowest = Duration::ZERO;
        for _ in 0..100 {
            let started = Instant::now();
            let outcome = coordinator
                .handle(sample_order(), CoordinationStrategy::Choreographed, &cancel)
                .await;
            slowest = slowest.max(started.elapsed());
            assert_eq!(outcome.label(), "published");
        }

        assert!(slowest < Duration::from_millis(200), "slowest request took {:?}", slowest);
        assert!(publisher.count() < 100);
    }

    #[tokio::test]
    async fn test_stopped_publisher_returns_bare_id() {
        let payments = Arc::new(StubPaymentGateway::new(StubBehaviour::Ok("unused")));
        let publisher = Arc::new(RecordingPublisher::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let events = EventDispatcher::spawn(publisher.clone(), metrics.clone());
        events.shutdown().await;
        let coordinator = OrderCoordinator::new(
            OrderProcessor::new(Duration::from_millis(5)),
            payments,
            events,
            metrics.clone(),
        );

        let outcome = coordinator
            .handle(sample_order(), CoordinationStrategy::Choreographed, &CancellationToken::new())
            .await;

        assert!(matches!(outcome, CoordinationOutcome::PublishAttempted { dispatched: false, .. }));
        assert_eq!(outcome.label(), "publish_failed");
        let message = outcome.into_result().message;
        assert!(message.parse::<Uuid>().is_ok());
        assert!(!message.contains('|'));
        assert_eq!(publisher.count(), 0);
        assert_eq!(metrics.counter_value("order_events_published_total", &["error"]), 1.0);
        assert_eq!(
            metrics.counter_value("orders_handled_total", &["choreographed", "publish_failed"]),
            1.0
        );
    }

    #[tokio::test]
    async fn test_cancelled_processing_still_completes_strategy() {
        let h = harness(StubBehaviour::Ok("PAID-123"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = h
            .coordinator
            .handle(sample_order(), CoordinationStrategy::Orchestrated, &cancel)
            .await;

        assert!(matches!(outcome, CoordinationOutcome::Merged(_)));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_get_distinct_ids() {
        let h = harness(StubBehaviour::Ok("PAID-123"));
        let strategies = [
            CoordinationStrategy::Simple,
            CoordinationStrategy::Orchestrated,
            CoordinationStrategy::Choreographed,
        ];

        let handles: Vec<_> = (0..150)
            .map(|i| {
                let coordinator = h.coordinator.clone();
                let strategy = strategies[i % strategies.len()];
                tokio::spawn(async move {
                    let outcome = coordinator
                        .handle(sample_order(), strategy, &CancellationToken::new())
                        .await;
                    (strategy, outcome)
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let (strategy, outcome) = handle.await.unwrap();
            let message = outcome.into_result().message;
            let id = match strategy {
                CoordinationStrategy::Orchestrated => {
                    let (id, payment) = message.split_once('|').unwrap();
                    assert_eq!(payment, "PAID-123");
                    id.to_string()
                }
                _ => {
                    assert!(!message.contains('|'));
                    message
                }
            };
            ids.insert(id);
        }

        assert_eq!(ids.len(), 150);
        h.publisher.wait_for(50).await;
    }
}
