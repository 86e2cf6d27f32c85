//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `V2vError` as one
//! variant where they surface core validation failures.

use thiserror::Error;

/// Validation failures of core value types.
#[derive(Debug, Error)]
pub enum V2vError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Shorthand result type for core constructors.
pub type V2vResult<T> = Result<T, V2vError>;
