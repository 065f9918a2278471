//! Service configuration, read from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the payment service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub base_url: String,
    pub charge_path: String,
    pub timeout: Duration,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8182".to_string(),
            charge_path: "/api/dio/v1/realizarPagamentoCompleto".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Broker connection and the topic order events go to.
#[derive(Debug, Clone)]
pub struct EventChannelSettings {
    pub brokers: String,
    pub topic: String,
    pub message_timeout: Duration,
}

impl Default for EventChannelSettings {
    fn default() -> Self {
        Self {
            brokers: "127.0.0.1:9092".to_string(),
            topic: "orders".to_string(),
            message_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub processing_delay: Duration,
    pub payment: PaymentSettings,
    pub events: EventChannelSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            processing_delay: Duration::from_millis(500),
            payment: PaymentSettings::default(),
            events: EventChannelSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            http_addr: parse_or(&lookup, "ORDER_HTTP_ADDR", defaults.http_addr)?,
            processing_delay: millis_or(&lookup, "ORDER_PROCESSING_DELAY_MS", defaults.processing_delay)?,
            payment: PaymentSettings {
                base_url: lookup("PAYMENT_BASE_URL").unwrap_or(defaults.payment.base_url),
                charge_path: lookup("PAYMENT_CHARGE_PATH").unwrap_or(defaults.payment.charge_path),
                timeout: millis_or(&lookup, "PAYMENT_TIMEOUT_MS", defaults.payment.timeout)?,
            },
            events: EventChannelSettings {
                brokers: lookup("KAFKA_BROKERS").unwrap_or(defaults.events.brokers),
                topic: non_empty_or(&lookup, "ORDER_EVENTS_TOPIC", defaults.events.topic)?,
                message_timeout: millis_or(&lookup, "KAFKA_MESSAGE_TIMEOUT_MS", defaults.events.message_timeout)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}

fn millis_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let millis = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

fn non_empty_or<F>(lookup: &F, key: &'static str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Invalid {
            key,
            value,
            reason: "must not be empty".to_string(),
        }),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.processing_delay, Duration::from_millis(500));
        assert_eq!(config.payment.base_url, "http://localhost:8182");
        assert_eq!(config.payment.charge_path, "/api/dio/v1/realizarPagamentoCompleto");
        assert_eq!(config.events.topic, "orders");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ORDER_HTTP_ADDR", "127.0.0.1:9000"),
            ("ORDER_PROCESSING_DELAY_MS", "0"),
            ("PAYMENT_BASE_URL", "http://payments:8182"),
            ("PAYMENT_TIMEOUT_MS", "2500"),
            ("KAFKA_BROKERS", "redpanda:9092"),
            ("ORDER_EVENTS_TOPIC", "order-placed"),
        ])
        .unwrap();

        assert_eq!(config.http_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.processing_delay, Duration::ZERO);
        assert_eq!(config.payment.base_url, "http://payments:8182");
        assert_eq!(config.payment.timeout, Duration::from_millis(2500));
        assert_eq!(config.events.brokers, "redpanda:9092");
        assert_eq!(config.events.topic, "order-placed");
    }

    #[test]
    fn test_invalid_delay_is_rejected() {
        let err = config_from(&[("ORDER_PROCESSING_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ORDER_PROCESSING_DELAY_MS", .. }));
    }

    #[test]
    fn test_empty_topic_is_rejected() {
        let err = config_from(&[("ORDER_EVENTS_TOPIC", " ")]).unwrap_err();
        assert!(err.to_string().contains("ORDER_EVENTS_TOPIC"));
    }
}
