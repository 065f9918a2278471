use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of correlation identifiers and processing timestamps.
///
/// Stateless; safe to call from any number of tasks at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderIdentity;

impl OrderIdentity {
    /// A fresh random (v4) identifier.
    pub fn new_id() -> Uuid {
        Uuid::new_v4()
    }

    pub fn now() -> DateTime<Utc> {
        Utc::now()
    }
}
