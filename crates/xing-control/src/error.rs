use thiserror::Error;

/// Lifecycle violations reported by the `try_*` entry points, and rejected
/// configurations from [`ControlConfig::validate`][crate::ControlConfig::validate].
///
/// The plain `initialize`/`shutdown` calls turn these into panics; contract
/// violations inside `enter`/`exit` always panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("intersection controller is already initialized")]
    AlreadyInitialized,

    #[error("intersection controller is not initialized")]
    NotInitialized,

    #[error("cannot shut down: {active} vehicle(s) admitted, {waiting} waiting")]
    Busy { active: u32, waiting: u32 },

    #[error("invalid controller configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type ControlResult<T> = Result<T, ControlError>;
