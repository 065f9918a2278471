use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Delimiter placed between sub-results when a payment confirmation is merged
/// into the order's own result.
pub const MESSAGE_DELIMITER: &str = "|";

/// A customer's order submission.
///
/// `id` and `order_date` are never read from a request body. They are only
/// ever written by [`super::OrderProcessor`].
#[derive(Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Order {
    #[serde(default, skip_deserializing)]
    pub id: Option<Uuid>,

    #[serde(rename = "nomeCliente", default)]
    pub customer_name: String,

    #[serde(rename = "numeroCartao", default)]
    pub card_number: String,

    #[serde(
        rename = "dataPedido",
        default,
        skip_deserializing,
        serialize_with = "chrono::serde::ts_milliseconds_option::serialize"
    )]
    pub order_date: Option<DateTime<Utc>>,

    #[serde(rename = "itens", default)]
    pub items: Vec<String>,
}

impl Order {
    #[allow(dead_code)]
    pub fn new(customer_name: impl Into<String>, card_number: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            id: None,
            customer_name: customer_name.into(),
            card_number: card_number.into(),
            order_date: None,
            items,
        }
    }
}

// Card numbers must not reach the logs.
impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("customer_name", &self.customer_name)
            .field("card_number", &"[REDACTED]")
            .field("order_date", &self.order_date)
            .field("items", &self.items)
            .finish()
    }
}

/// Outcome message returned to the caller (and by the payment service).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProcessingResult {
    pub message: String,
}

impl ProcessingResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn for_order(order_id: Uuid) -> Self {
        Self::new(order_id.to_string())
    }

    /// Appends a downstream sub-result. Consumes `self` so a result can only
    /// be merged once.
    pub fn merged_with(self, other: &ProcessingResult) -> Self {
        Self {
            message: format!("{}{}{}", self.message, MESSAGE_DELIMITER, other.message),
        }
    }
}

/// Which downstream behaviour runs after local processing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoordinationStrategy {
    Simple,
    Orchestrated,
    Choreographed,
}

impl CoordinationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinationStrategy::Simple => "simple",
            CoordinationStrategy::Orchestrated => "orchestrated",
            CoordinationStrategy::Choreographed => "choreographed",
        }
    }
}

impl fmt::Display for CoordinationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
