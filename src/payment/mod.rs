// ============================================================================
// Payment Gateway - synchronous downstream used by the orchestrated flow
// ============================================================================

mod http;

pub use http::HttpPaymentGateway;

use async_trait::async_trait;

use crate::domain::order::{Order, ProcessingResult};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment circuit breaker is open")]
    CircuitOpen,

    #[error("payment service unreachable: {0}")]
    Transport(String),

    #[error("payment service responded with status {status}")]
    Rejected { status: u16 },

    #[error("payment response could not be decoded: {0}")]
    Decode(String),
}

/// Charges an order against the payment service.
///
/// `Ok` means the downstream reported OK. Timeouts are the implementation's
/// concern; callers apply none of their own.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, order: &Order) -> Result<ProcessingResult, PaymentError>;
}
