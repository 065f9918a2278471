// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Health reporting shared by the actors and the collaborators they wrap.
//
// ============================================================================

pub mod health;

pub use health::*;
