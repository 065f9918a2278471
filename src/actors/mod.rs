// ============================================================================
// Actors Module
// ============================================================================
//
// Background work that must not hold up a request.
//
// Structure:
// - core/      - Health reporting shared with the outbound collaborators
// - publisher  - Fire-and-forget publishing of order events
//
// ============================================================================

pub mod core;
mod publisher;

pub use publisher::EventDispatcher;

#[cfg(test)]
pub(crate) use publisher::tests::RecordingPublisher;
