use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::identity::OrderIdentity;
use super::value_objects::Order;

// ============================================================================
// Order Processor - Local processing stage
// ============================================================================
//
// Normalises the order identity and runs the local processing step. The step
// is modelled as a fixed delay; it is where a real consistency check or
// inventory reservation would live.
//
// ============================================================================

pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct OrderProcessor {
    processing_delay: Duration,
}

impl OrderProcessor {
    pub fn new(processing_delay: Duration) -> Self {
        Self { processing_delay }
    }

    /// Assigns identity and timestamp, then runs the processing stage.
    ///
    /// Any `id`/`order_date` already on the order is overwritten. If `cancel`
    /// fires during the stage the order is still accepted: a warning is logged,
    /// the token stays cancelled for the caller to observe, and the assigned
    /// id is returned.
    pub async fn process(&self, order: &mut Order, cancel: &CancellationToken) -> Uuid {
        let order_id = OrderIdentity::new_id();
        order.id = Some(order_id);
        order.order_date = Some(OrderIdentity::now());

        tracing::info!(order_id = %order_id, "Processing order...");
        tracing::debug!(order_id = %order_id, order = ?order, "Full order snapshot");

        tokio::select! {
            _ = tokio::time::sleep(self.processing_delay) => {
                tracing::info!(order_id = %order_id, "Stage 1: order in process");
            }
            _ = cancel.cancelled() => {
                tracing::warn!(
                    order_id = %order_id,
                    "Order processing interrupted; accepting order without completing the stage"
                );
                // Idempotent; keeps the signal visible to whoever owns the token.
                cancel.cancel();
            }
        }

        order_id
    }
}

impl Default for OrderProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESSING_DELAY)
    }
}
