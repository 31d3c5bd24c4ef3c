//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `XingError` as one
//! variant where a movement-level failure can surface.

use thiserror::Error;

use crate::Direction;

/// The top-level error type for `xing-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XingError {
    #[error("u-turn {0}→{0} is not a movement")]
    UTurn(Direction),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for all `xing-*` crates.
pub type XingResult<T> = Result<T, XingError>;
