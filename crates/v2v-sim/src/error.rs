use thiserror::Error;

use v2v_vehicle::VehicleError;

use crate::EngineState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from:   EngineState,
        action: &'static str,
    },

    #[error("engine configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Vehicle(#[from] VehicleError),
}

pub type SimResult<T> = Result<T, SimError>;
