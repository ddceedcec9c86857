//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the roster domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::PassId;
pub use timestamp::{LocalTimestamp, TIMESTAMP_FORMAT};
