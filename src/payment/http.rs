use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::{PaymentError, PaymentGateway};
use crate::actors::core::{ComponentHealth, HealthCheckable};
use crate::domain::order::{Order, ProcessingResult};
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

/// Payment service reached over HTTP.
///
/// The `reqwest::Client` is built once and shared by every request.
pub struct HttpPaymentGateway {
    client: Client,
    charge_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, charge_path: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, charge_path))
    }

    pub fn with_client(client: Client, base_url: &str, charge_path: &str) -> Self {
        let charge_url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            charge_path.trim_start_matches('/')
        );

        Self {
            client,
            charge_url,
            circuit_breaker: CircuitBreaker::new("payment-gateway", CircuitBreakerConfig::default()),
        }
    }

    #[allow(dead_code)]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = CircuitBreaker::new("payment-gateway", config);
        self
    }

    pub fn charge_url(&self) -> &str {
        &self.charge_url
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state().await
    }

    async fn send_charge(&self, order: &Order) -> Result<ProcessingResult, PaymentError> {
        let response = self
            .client
            .post(&self.charge_url)
            .json(order)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PaymentError::Rejected { status: status.as_u16() });
        }

        response
            .json::<ProcessingResult>()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn charge(&self, order: &Order) -> Result<ProcessingResult, PaymentError> {
        let result = self.circuit_breaker.call(self.send_charge(order)).await;

        match result {
            Ok(payment) => {
                tracing::debug!(order_id = ?order.id, url = %self.charge_url, "Payment service accepted charge");
                Ok(payment)
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(order_id = ?order.id, "Circuit breaker open - payment service unavailable");
                Err(PaymentError::CircuitOpen)
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(order_id = ?order.id, error = %e, "Payment charge failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for HttpPaymentGateway {
    fn component_name(&self) -> &str {
        "payment-gateway"
    }

    async fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(self.component_name(), self.circuit_state().await.into())
    }
}
