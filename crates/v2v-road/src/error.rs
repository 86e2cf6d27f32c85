//! Road-network error type.

use thiserror::Error;

use v2v_core::V2vError;

/// Errors produced by `v2v-road`.
#[derive(Debug, Error)]
pub enum RoadError {
    #[error("edge references unknown node id {0}")]
    UnknownNodeRef(i64),

    #[error("duplicate node id {0}")]
    DuplicateNode(i64),

    #[error("road CSV parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] V2vError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RoadResult<T> = Result<T, RoadError>;
