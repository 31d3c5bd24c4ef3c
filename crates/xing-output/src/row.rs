//! Plain data row types written by output backends.

use xing_core::Movement;
use xing_sim::{MovementStats, TripRecord};

/// One completed trip.  Durations are in microseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRow {
    pub vehicle:    u32,
    pub trip:       u32,
    /// `"N→S"` style label.
    pub movement:   String,
    pub turn:       &'static str,
    pub wait_us:    u64,
    pub transit_us: u64,
}

impl From<&TripRecord> for TripRow {
    fn from(t: &TripRecord) -> Self {
        Self {
            vehicle:    t.vehicle.0,
            trip:       t.trip,
            movement:   t.movement.to_string(),
            turn:       t.movement.turn().as_str(),
            wait_us:    t.waited.as_micros() as u64,
            transit_us: t.transit.as_micros() as u64,
        }
    }
}

/// End-of-run statistics for one movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementSummaryRow {
    pub movement:     String,
    pub trips:        u64,
    pub mean_wait_us: u64,
    pub max_wait_us:  u64,
}

impl MovementSummaryRow {
    pub fn new(movement: Movement, stats: &MovementStats) -> Self {
        Self {
            movement:     movement.to_string(),
            trips:        stats.trips,
            mean_wait_us: stats.mean_wait().as_micros() as u64,
            max_wait_us:  stats.max_wait.as_micros() as u64,
        }
    }
}
