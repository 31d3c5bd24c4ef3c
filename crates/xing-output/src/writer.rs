//! The `OutputWriter` trait implemented by backend writers.

use crate::{MovementSummaryRow, OutputResult, TripRow};

/// Sink for trip rows and the end-of-run summary.
///
/// Errors surface through [`TripLogObserver::take_error`][crate::TripLogObserver::take_error]
/// when the writer is driven by a simulation.
pub trait OutputWriter {
    /// Append one completed trip.
    fn write_trip(&mut self, row: &TripRow) -> OutputResult<()>;

    /// Write the per-movement summary, one row per movement.
    fn write_summary(&mut self, rows: &[MovementSummaryRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
