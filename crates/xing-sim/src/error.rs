use thiserror::Error;
use xing_control::ControlError;
use xing_core::VehicleId;

use crate::Collision;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("could not spawn vehicle thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("vehicle {0} panicked")]
    VehiclePanicked(VehicleId),

    #[error("{count} collision(s) observed; first: {first}")]
    Collision {
        count: usize,
        first: Collision,
    },

    #[error("controller error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;
