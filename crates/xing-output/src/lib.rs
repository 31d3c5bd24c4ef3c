//! `xing-output` — run output writers for the rust_xing framework.
//!
//! | Backend | Files created                           |
//! |---------|-----------------------------------------|
//! | CSV     | `trips.csv`, `movement_summary.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`TripLogObserver`], which implements `xing_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use xing_output::{CsvWriter, TripLogObserver};
//!
//! let obs = TripLogObserver::new(CsvWriter::new(Path::new("./output"))?);
//! sim.run(&obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TripLogObserver;
pub use row::{MovementSummaryRow, TripRow};
pub use writer::OutputWriter;
