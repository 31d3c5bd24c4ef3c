//! Simulation observer trait for progress reporting and data collection.

use std::time::Duration;

use xing_core::{Movement, VehicleId};

use crate::SimReport;

/// One completed trip through the intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TripRecord {
    pub vehicle:  VehicleId,
    /// Zero-based trip number for this vehicle.
    pub trip:     u32,
    pub movement: Movement,
    /// Time spent blocked in `enter`.
    pub waited:   Duration,
    /// Time spent inside the box.
    pub transit:  Duration,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] from the
/// vehicle threads.
///
/// Hooks take `&self` and run concurrently on many threads, so implementors
/// use their own interior synchronisation.  All methods default to no-ops.
///
/// # Example: trip counter
///
/// ```rust,ignore
/// struct TripCounter(AtomicU64);
///
/// impl SimObserver for TripCounter {
///     fn on_exit(&self, _trip: &TripRecord) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait SimObserver: Sync {
    /// A vehicle reached the stop line and is about to call `enter`.
    fn on_arrive(&self, _vehicle: VehicleId, _movement: Movement) {}

    /// A vehicle was admitted after waiting `waited`.
    fn on_enter(&self, _vehicle: VehicleId, _movement: Movement, _waited: Duration) {}

    /// A vehicle has called `exit`.
    fn on_exit(&self, _trip: &TripRecord) {}

    /// Called once after every vehicle has finished and the controller has
    /// been shut down.
    fn on_sim_end(&self, _report: &SimReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
