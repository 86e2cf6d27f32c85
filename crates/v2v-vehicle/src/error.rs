use thiserror::Error;

use v2v_core::{NodeId, VehicleId};

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("node {0} is not part of the road network")]
    NodeNotFound(NodeId),

    #[error("invalid {what} {value}: must be finite and non-negative")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("vehicle {0} not found")]
    NotFound(VehicleId),

    #[error("vehicle id space exhausted")]
    IdsExhausted,
}

pub type VehicleResult<T> = Result<T, VehicleError>;
