//! End-of-run statistics.

use std::time::Duration;

use xing_control::Totals;
use xing_core::Movement;

use crate::TripRecord;

/// Wait-time statistics for one movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementStats {
    pub trips:      u64,
    pub total_wait: Duration,
    pub max_wait:   Duration,
}

impl MovementStats {
    pub fn record(&mut self, trip: &TripRecord) {
        self.trips += 1;
        self.total_wait += trip.waited;
        self.max_wait = self.max_wait.max(trip.waited);
    }

    pub fn merge(&mut self, other: &MovementStats) {
        self.trips += other.trips;
        self.total_wait += other.total_wait;
        self.max_wait = self.max_wait.max(other.max_wait);
    }

    /// Mean wait per trip; zero when there were no trips.
    pub fn mean_wait(&self) -> Duration {
        match u32::try_from(self.trips) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_wait / n,
            Err(_) => Duration::from_secs_f64(self.total_wait.as_secs_f64() / self.trips as f64),
        }
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimReport {
    pub vehicles:  usize,
    pub trips:     u64,
    pub elapsed:   Duration,
    /// Indexed by `Movement::index()`.
    pub movements: [MovementStats; Movement::COUNT],
    /// Most vehicles inside the box at once.
    pub peak_in_box: u32,
    /// Controller counters at shutdown.
    pub controller: Totals,
}

impl SimReport {
    #[inline]
    pub fn movement(&self, m: Movement) -> &MovementStats {
        &self.movements[m.index()]
    }

    /// Statistics folded over every movement.
    pub fn overall(&self) -> MovementStats {
        self.movements.iter().fold(MovementStats::default(), |mut acc, s| {
            acc.merge(s);
            acc
        })
    }

    /// Completed trips per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.trips as f64 / secs } else { 0.0 }
    }
}
