//! `xing-sim` — thread-per-vehicle driver for the intersection controller.
//!
//! Every vehicle is an OS thread that arrives after a random delay, draws a
//! movement, blocks in `enter`, spends a random transit time inside the box,
//! then calls `exit`.  A [`CollisionMonitor`] independent of the controller
//! checks that no two crossing movements were ever inside together.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`sim`]      | `Simulation::run` / `run_global`, vehicle threads    |
//! | [`builder`]  | `SimBuilder`                                         |
//! | [`config`]   | `SimConfig`, `DelayRange`                            |
//! | [`monitor`]  | `CollisionMonitor`, `Occupancy` guard, `Collision`   |
//! | [`observer`] | `SimObserver` hooks, `TripRecord`, `NoopObserver`    |
//! | [`report`]   | `SimReport`, `MovementStats`                         |
//! | [`error`]    | `SimError`, `SimResult<T>`                           |
//!
//! # Quick-start
//!
//! ```rust
//! use xing_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let sim = SimBuilder::new(SimConfig::default())
//!     .vehicles(4)
//!     .trips(3)
//!     .build()
//!     .unwrap();
//! let report = sim.run(&NoopObserver).unwrap();
//! assert_eq!(report.trips, 12);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod monitor;
pub mod observer;
pub mod report;
pub mod sim;


pub use builder::SimBuilder;
pub use config::{DelayRange, SimConfig};
pub use error::{SimError, SimResult};
pub use monitor::{Collision, CollisionMonitor, Occupancy};
pub use observer::{NoopObserver, SimObserver, TripRecord};
pub use report::{MovementStats, SimReport};
pub use sim::Simulation;
