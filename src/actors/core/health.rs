use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::utils::CircuitState;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Collaborators that talk to the outside world (payment service, broker)
// report their health through `HealthCheckable`; the /health endpoint folds
// them into a single `SystemHealth`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    #[allow(dead_code)]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            HealthStatus::Healthy => None,
            HealthStatus::Degraded(msg) | HealthStatus::Unhealthy(msg) => Some(msg),
        }
    }
}

impl From<CircuitState> for HealthStatus {
    fn from(state: CircuitState) -> Self {
        match state {
            CircuitState::Closed => HealthStatus::Healthy,
            CircuitState::HalfOpen => HealthStatus::Degraded("Circuit breaker half-open".to_string()),
            CircuitState::Open => HealthStatus::Unhealthy("Circuit breaker open".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
        }
    }
}

/// Anything that can report on a downstream dependency.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    fn component_name(&self) -> &str;

    async fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(self.component_name(), HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

impl SystemHealth {
    pub async fn collect(checks: &[std::sync::Arc<dyn HealthCheckable>]) -> Self {
        let mut components = Vec::with_capacity(checks.len());
        for check in checks {
            components.push(check.check_health().await);
        }
        Self::from_components(components)
    }

    /// Any unhealthy component makes the system unhealthy; otherwise any
    /// degraded component makes it degraded.
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let mut has_degraded = false;
        let mut unhealthy = Vec::new();

        for health in &components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => unhealthy.push(format!("{}: {}", health.name, msg)),
                HealthStatus::Degraded(_) => has_degraded = true,
                HealthStatus::Healthy => {}
            }
        }

        let overall_status = if !unhealthy.is_empty() {
            HealthStatus::Unhealthy(unhealthy.join(", "))
        } else if has_degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            components,
            check_time: Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let components: Vec<_> = self
            .components
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "status": c.status.as_str(),
                    "detail": c.status.detail(),
                    "last_check": c.last_check,
                })
            })
            .collect();

        json!({
            "status": self.overall_status.as_str(),
            "detail": self.overall_status.detail(),
            "service": "order-coordinator",
            "check_time": self.check_time,
            "components": components,
        })
    }
}
