//! The intersection controller: blocking `enter`, waking `exit`.
//!
//! # Protocol
//!
//! ```text
//! enter(m):  lock
//!            while !admissible(m): park on lane[m]      (releases the lock)
//!            active[m] += 1
//!            unlock
//!
//! exit(m):   lock
//!            active[m] -= 1                               (panics if already 0)
//!            for each w with waiters and admissible(w): broadcast lane[w]
//!            unlock
//! ```
//!
//! One mutex guards the whole [`AdmissionState`]; each movement has its own
//! condition variable ("lane"), so an exit only disturbs the threads that
//! can actually make progress.  A thread is counted into `active` only after
//! it passes the check, so a late arrival can never claim the box before the
//! safety test.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use xing_core::{Direction, Movement};

use crate::state::{AdmissionSnapshot, AdmissionState};
use crate::{ControlConfig, ControlError, ControlResult, WakeStrategy};

// ── Shared core ───────────────────────────────────────────────────────────────

/// State shared between the controller handle and the optional signaler.
struct Shared {
    state:  Mutex<AdmissionState>,
    lanes:  [Condvar; Movement::COUNT],
    /// Parks the signaler between polls; notified on shutdown.
    halt:   Condvar,
    config: ControlConfig,
}

impl Shared {
    /// Take the lock.  Contract-violation panics fire before any mutation,
    /// so the state behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast on every parked movement that can now make progress.
    fn wake_ready(&self, state: &mut AdmissionState) {
        for m in state.ready(self.config.fairness).iter() {
            trace!(movement = %m, "waking");
            self.lanes[m.index()].notify_all();
            state.totals.wakeups += 1;
        }
    }

    /// Run the configured wake strategy after a state change.
    fn wake(&self, state: &mut AdmissionState) {
        match self.config.wake {
            WakeStrategy::Targeted => self.wake_ready(state),
            WakeStrategy::Broadcast => {
                for m in state.waiters().iter() {
                    self.lanes[m.index()].notify_all();
                    state.totals.wakeups += 1;
                }
            }
            WakeStrategy::Polling { .. } => {}
        }
    }

    /// Body of the polling signaler thread.
    fn signal_loop(&self, interval: Duration) {
        let mut state = self.lock();
        while !state.closed {
            self.wake_ready(&mut state);
            state = self
                .halt
                .wait_timeout(state, interval)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        debug!("signaler stopped");
    }
}

// ── IntersectionController ────────────────────────────────────────────────────

/// Admission control for one four-way intersection.
///
/// Cheap to share behind an `Arc` (or a plain reference in scoped threads):
/// every method takes `&self`.
pub struct IntersectionController {
    shared: Arc<Shared>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl IntersectionController {
    /// Controller with the default configuration (targeted wake, no aging).
    pub fn new() -> Self {
        Self::with_config(ControlConfig::default())
    }

    /// Create the lock, the twelve lane condition variables and zeroed
    /// counts.  Starts the signaler thread under [`WakeStrategy::Polling`].
    pub fn with_config(config: ControlConfig) -> Self {
        let shared = Arc::new(Shared {
            state:  Mutex::new(AdmissionState::new()),
            lanes:  std::array::from_fn(|_| Condvar::new()),
            halt:   Condvar::new(),
            config,
        });

        let poller = match config.wake {
            WakeStrategy::Polling { interval } => {
                let shared = Arc::clone(&shared);
                let spawned = thread::Builder::new()
                    .name("xing-signaler".into())
                    .spawn(move || shared.signal_loop(interval));
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => panic!("could not spawn intersection signaler: {e}"),
                }
            }
            _ => None,
        };

        debug!(?config, "intersection controller created");
        Self { shared, poller: Mutex::new(poller) }
    }

    pub fn config(&self) -> ControlConfig {
        self.shared.config
    }

    // ── Entry / exit ──────────────────────────────────────────────────────

    /// Block until a vehicle travelling `origin → destination` may enter,
    /// then count it in.
    ///
    /// # Panics
    /// Panics on a u-turn or if the controller has been shut down.
    pub fn enter(&self, origin: Direction, destination: Direction) {
        self.enter_movement(movement_of(origin, destination));
    }

    /// [`enter`](Self::enter) for an already-built movement.
    pub fn enter_movement(&self, m: Movement) {
        let shared = &*self.shared;
        let policy = shared.config.fairness;
        let mut state = shared.lock();
        assert!(!state.closed, "enter({m}) on a shut down intersection controller");

        let mut released = false;
        if !state.admissible(m, policy) {
            state.begin_wait(m);
            debug!(movement = %m, "blocked");
            while !state.admissible(m, policy) {
                state = shared.lanes[m.index()]
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            released = state.end_wait(m);
        }

        state.admit(m, policy);
        debug!(movement = %m, active = state.active(m), "admitted");

        // A starvation mark just cleared: movements it held back may go.
        if released {
            shared.wake(&mut state);
        }
    }

    /// Count a vehicle travelling `origin → destination` out and wake every
    /// blocked movement that is now safe.
    ///
    /// # Panics
    /// Panics if no vehicle is transiting that movement (an `exit` without a
    /// matching `enter`), on a u-turn, or after shutdown.
    pub fn exit(&self, origin: Direction, destination: Direction) {
        self.exit_movement(movement_of(origin, destination));
    }

    /// [`exit`](Self::exit) for an already-built movement.
    pub fn exit_movement(&self, m: Movement) {
        let shared = &*self.shared;
        let mut state = shared.lock();
        assert!(!state.closed, "exit({m}) on a shut down intersection controller");
        state.release(m);
        debug!(movement = %m, active = state.active(m), "exited");
        shared.wake(&mut state);
    }

    /// Enter and return a guard that exits when dropped.
    pub fn pass(&self, origin: Direction, destination: Direction) -> Passage<'_> {
        let movement = movement_of(origin, destination);
        self.enter_movement(movement);
        Passage { controller: self, movement }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// `true` if `m` could be admitted right now without waiting.
    pub fn can_enter(&self, m: Movement) -> bool {
        self.shared.lock().admissible(m, self.shared.config.fairness)
    }

    pub fn snapshot(&self) -> AdmissionSnapshot {
        self.shared.lock().snapshot()
    }

    /// No vehicle admitted and no thread parked.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().is_idle()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.lock().closed
    }

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Close the controller and stop the signaler.
    ///
    /// Fails with [`ControlError::Busy`] (and changes nothing) if any vehicle
    /// is still admitted or parked.  Shutting down twice is a no-op.
    pub fn try_shutdown(&self) -> ControlResult<()> {
        {
            let mut state = self.shared.lock();
            if state.closed {
                return Ok(());
            }
            if !state.is_idle() {
                return Err(ControlError::Busy {
                    active:  state.total_active(),
                    waiting: state.total_waiting(),
                });
            }
            state.closed = true;
            self.shared.halt.notify_all();
        }
        self.join_poller();
        let totals = self.snapshot().totals;
        info!(
            admitted = totals.admitted,
            blocked = totals.blocked,
            wakeups = totals.wakeups,
            "intersection controller shut down"
        );
        Ok(())
    }

    /// Like [`try_shutdown`](Self::try_shutdown) but a busy controller is a
    /// fatal lifecycle violation.
    pub fn shutdown(&self) {
        if let Err(e) = self.try_shutdown() {
            panic!("intersection shutdown: {e}");
        }
    }

    fn join_poller(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("signaler thread panicked");
            }
        }
    }
}

impl Default for IntersectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntersectionController {
    fn drop(&mut self) {
        // Stop the signaler even if nobody called shutdown.
        {
            let mut state = self.shared.lock();
            state.closed = true;
            self.shared.halt.notify_all();
        }
        self.join_poller();
    }
}

// ── Passage ───────────────────────────────────────────────────────────────────

/// An admitted transit.  Dropping it calls `exit` for the same movement.
#[must_use = "dropping a Passage immediately exits the intersection"]
pub struct Passage<'a> {
    controller: &'a IntersectionController,
    movement:   Movement,
}

impl Passage<'_> {
    pub fn movement(&self) -> Movement {
        self.movement
    }
}

impl Drop for Passage<'_> {
    fn drop(&mut self) {
        self.controller.exit_movement(self.movement);
    }
}

fn movement_of(origin: Direction, destination: Direction) -> Movement {
    match Movement::new(origin, destination) {
        Some(m) => m,
        None => panic!("u-turn {origin}→{destination} cannot use the intersection"),
    }
}
