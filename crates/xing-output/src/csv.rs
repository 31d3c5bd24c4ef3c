//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `trips.csv`
//! - `movement_summary.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MovementSummaryRow, OutputResult, TripRow};

/// Writes run output to two CSV files.
pub struct CsvWriter {
    trips:    Writer<File>,
    summary:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open both files, and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut trips = Writer::from_path(dir.join("trips.csv"))?;
        trips.write_record(["vehicle", "trip", "movement", "turn", "wait_us", "transit_us"])?;

        let mut summary = Writer::from_path(dir.join("movement_summary.csv"))?;
        summary.write_record(["movement", "trips", "mean_wait_us", "max_wait_us"])?;

        Ok(Self { trips, summary, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_trip(&mut self, row: &TripRow) -> OutputResult<()> {
        self.trips.write_record(&[
            row.vehicle.to_string(),
            row.trip.to_string(),
            row.movement.clone(),
            row.turn.to_string(),
            row.wait_us.to_string(),
            row.transit_us.to_string(),
        ])?;
        Ok(())
    }

    fn write_summary(&mut self, rows: &[MovementSummaryRow]) -> OutputResult<()> {
        for row in rows {
            self.summary.write_record(&[
                row.movement.clone(),
                row.trips.to_string(),
                row.mean_wait_us.to_string(),
                row.max_wait_us.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trips.flush()?;
        self.summary.flush()?;
        Ok(())
    }
}
