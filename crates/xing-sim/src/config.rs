//! Simulation configuration.

use std::time::Duration;

use xing_control::ControlConfig;
use xing_core::VehicleRng;

use crate::{SimError, SimResult};

// ── DelayRange ────────────────────────────────────────────────────────────────

/// A uniformly sampled pause, `min..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange { min: Duration::ZERO, max: Duration::ZERO };

    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Convenience constructor in microseconds.
    pub fn micros(min: u64, max: u64) -> Self {
        Self::new(Duration::from_micros(min), Duration::from_micros(max))
    }

    /// Draw a pause.  Nanosecond resolution; `min` if the range is empty.
    pub fn sample(&self, rng: &mut VehicleRng) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span = (self.max - self.min).as_nanos().min(u64::MAX as u128) as u64;
        self.min + Duration::from_nanos(rng.gen_range(0..=span))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built by the application (CLI flags or a JSON file) and passed
/// to [`SimBuilder`][crate::SimBuilder].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Number of vehicles, one thread each.
    pub vehicles: usize,

    /// Trips each vehicle makes through the intersection.
    pub trips_per_vehicle: u32,

    /// Master RNG seed.  Fixes every vehicle's sequence of movements and
    /// delays; thread interleaving is still up to the OS.
    pub seed: u64,

    /// Pause before each arrival.
    pub arrival_delay: DelayRange,

    /// Time spent inside the box once admitted.
    pub transit_time: DelayRange,

    /// Relative likelihood of `[straight, right, left]`.
    pub turn_weights: [f64; 3],

    /// Controller wake strategy and fairness policy.
    pub control: ControlConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicles:          10,
            trips_per_vehicle: 10,
            seed:              42,
            arrival_delay:     DelayRange::micros(0, 1_000),
            transit_time:      DelayRange::micros(100, 500),
            turn_weights:      [1.0, 1.0, 1.0],
            control:           ControlConfig::default(),
        }
    }
}

impl SimConfig {
    /// Total trips the run will make.
    #[inline]
    pub fn total_trips(&self) -> u64 {
        self.vehicles as u64 * self.trips_per_vehicle as u64
    }

    /// Reject configurations the driver cannot run.
    pub fn validate(&self) -> SimResult<()> {
        if self.vehicles == 0 {
            return Err(SimError::Config("at least one vehicle is required".into()));
        }
        if u32::try_from(self.vehicles).is_err() {
            return Err(SimError::Config(format!("{} vehicles exceeds u32 ids", self.vehicles)));
        }
        for (what, range) in [("arrival_delay", self.arrival_delay), ("transit_time", self.transit_time)] {
            if range.min > range.max {
                return Err(SimError::Config(format!(
                    "{what}: min {:?} exceeds max {:?}",
                    range.min, range.max
                )));
            }
        }
        if self.turn_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SimError::Config(format!(
                "turn weights must be finite and non-negative, got {:?}",
                self.turn_weights
            )));
        }
        if self.turn_weights.iter().sum::<f64>() <= 0.0 {
            return Err(SimError::Config("at least one turn weight must be positive".into()));
        }
        self.control
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))
    }
}
