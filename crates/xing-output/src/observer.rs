//! `TripLogObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use xing_core::Movement;
use xing_sim::{SimObserver, SimReport, TripRecord};

use crate::row::{MovementSummaryRow, TripRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

struct Inner<W> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W> Inner<W> {
    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

/// A [`SimObserver`] that logs every trip and the final per-movement summary
/// to any [`OutputWriter`].
///
/// Vehicle threads call the hooks concurrently, so the writer sits behind a
/// mutex and trip rows land in completion order.  Write errors are stored
/// because hooks have no return value; check [`take_error`][Self::take_error]
/// after the run.
pub struct TripLogObserver<W: OutputWriter> {
    inner: Mutex<Inner<W>>,
}

impl<W: OutputWriter + Send> TripLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: Mutex::new(Inner { writer, last_error: None }) }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the stored write error (if any) after the run returns.
    pub fn take_error(&self) -> Option<OutputError> {
        self.lock().last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner).writer
    }
}

impl<W: OutputWriter + Send> SimObserver for TripLogObserver<W> {
    fn on_exit(&self, trip: &TripRecord) {
        let row = TripRow::from(trip);
        let mut inner = self.lock();
        let result = inner.writer.write_trip(&row);
        inner.store_err(result);
    }

    fn on_sim_end(&self, report: &SimReport) {
        let rows: Vec<MovementSummaryRow> = Movement::ALL
            .iter()
            .map(|&m| MovementSummaryRow::new(m, report.movement(m)))
            .collect();
        let mut inner = self.lock();
        let result = inner.writer.write_summary(&rows);
        inner.store_err(result);
        let result = inner.writer.finish();
        inner.store_err(result);
    }
}
