use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::time::Duration;

use super::{EventPublisher, PublishError};
use crate::actors::core::{ComponentHealth, HealthCheckable};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

/// Kafka-protocol producer (Redpanda or Kafka) bound to one topic.
pub struct RedpandaClient {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaClient {
    pub fn new(brokers: &str, topic: impl Into<String>, message_timeout: Duration) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", message_timeout.as_millis().to_string())
            .create()?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 3,
        };

        Ok(Self {
            producer,
            topic: topic.into(),
            send_timeout: message_timeout,
            circuit_breaker: CircuitBreaker::new("event-publisher", cb_config),
        })
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state().await
    }
}

#[async_trait]
impl EventPublisher for RedpandaClient {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(&self.topic).key(key).payload(payload);

                self.producer
                    .send(record, Timeout::After(self.send_timeout))
                    .await
                    .map_err(|(e, _)| PublishError::Broker(e.to_string()))?;

                Ok::<(), PublishError>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(topic = %self.topic, key = %key, "Published to Redpanda");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %self.topic, "Circuit breaker open - Redpanda unavailable");
                Err(PublishError::CircuitOpen)
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, topic = %self.topic, "Failed to publish to Redpanda");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for RedpandaClient {
    fn component_name(&self) -> &str {
        "event-publisher"
    }

    async fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(self.component_name(), self.circuit_state().await.into())
    }
}
