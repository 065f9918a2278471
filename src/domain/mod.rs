// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order coordination. Outbound collaborators (payment service, event
// channel) sit behind traits in `payment` and `messaging`.
//
// ============================================================================

pub mod order;
