//! `xing-control` — conflict-aware admission control for a four-way
//! intersection.
//!
//! Vehicles call [`IntersectionController::enter`] before crossing and
//! [`IntersectionController::exit`] afterwards.  `enter` blocks while any
//! admitted movement crosses the requested one; movements that do not cross
//! (including the same movement, and opposing straights) share the box.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`controller`] | `IntersectionController`, `Passage` guard                 |
//! | [`state`]      | `AdmissionSnapshot`, `Totals` (the live state is private) |
//! | [`config`]     | `ControlConfig`, `WakeStrategy`, `FairnessPolicy`         |
//! | [`lifecycle`]  | Process-wide `initialize` / `enter` / `exit` / `shutdown` |
//! | [`error`]      | `ControlError`, `ControlResult<T>`                        |
//!
//! # Failure model
//!
//! Correct use never returns an error from `enter`/`exit`.  An `exit`
//! without a matching `enter`, a u-turn, or use after shutdown is a caller
//! bug and panics.  Shutting down while vehicles are inside panics through
//! `shutdown` and is reported as [`ControlError::Busy`] through
//! `try_shutdown`.
//!
//! # Quick-start
//!
//! ```rust
//! use xing_control::IntersectionController;
//! use xing_core::Direction::{North, South};
//!
//! let ix = IntersectionController::new();
//! ix.enter(North, South);
//! ix.enter(South, North); // opposing straights never conflict
//! ix.exit(North, South);
//! ix.exit(South, North);
//! ix.shutdown();
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::{ControlConfig, FairnessPolicy, WakeStrategy};
pub use controller::{IntersectionController, Passage};
pub use error::{ControlError, ControlResult};
pub use state::{AdmissionSnapshot, Totals};
