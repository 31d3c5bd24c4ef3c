//! `xing-core` — the movement model for the `rust_xing` intersection controller.
//!
//! This crate is a dependency of every other `xing-*` crate.  It holds only
//! immutable, `Copy` data and pure functions: nothing here needs a lock, and
//! every type is safe to read from any number of threads at once.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`direction`]   | `Direction`, `Turn`                                   |
//! | [`movement`]    | `Movement` (the 12 legal paths), dense indexing       |
//! | [`conflict`]    | `ConflictSet`, `conflicts`, the fixed crossing table  |
//! | [`ids`]         | `VehicleId`                                           |
//! | [`rng`]         | `VehicleRng` (per-vehicle, deterministic)             |
//! | [`error`]       | `XingError`, `XingResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod conflict;
pub mod direction;
pub mod error;
pub mod ids;
pub mod movement;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use conflict::{ConflictSet, conflicts};
pub use direction::{Direction, Turn};
pub use error::{XingError, XingResult};
pub use ids::VehicleId;
pub use movement::Movement;
pub use rng::VehicleRng;
