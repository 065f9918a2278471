// ============================================================================
// Messaging - event channel used by the choreographed flow
// ============================================================================

mod redpanda;

pub use redpanda::RedpandaClient;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("order event could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("broker circuit breaker is open")]
    CircuitOpen,

    #[error("broker rejected event: {0}")]
    Broker(String),

    #[error("publisher mailbox is closed")]
    MailboxClosed,
}

/// Publish sink for order events. Delivery acknowledgement is internal to the
/// implementation; the order flow never waits on it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    fn topic(&self) -> &str;

    async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), PublishError>;
}
