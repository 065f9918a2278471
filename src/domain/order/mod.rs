// ============================================================================
// Order Domain - Order coordination
// ============================================================================
//
// - Value objects (Order, ProcessingResult, CoordinationStrategy)
// - Identity (correlation ids and processing timestamps)
// - Processor (local processing stage)
// - Coordinator (strategy branching and result merging)
//
// ============================================================================

pub mod value_objects;
pub mod identity;
pub mod processor;
pub mod coordinator;

pub use value_objects::*;
pub use processor::*;
pub use coordinator::*;
