//! `CollisionMonitor` — an occupancy table kept apart from the controller.
//!
//! Vehicles register here only after `enter` returns and deregister before
//! they call `exit`, so the monitor's view of the box is always a subset of
//! the controller's.  Any crossing pair it sees is therefore a real safety
//! violation, not an artefact of timing.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;
use xing_core::{Movement, VehicleId};

/// A vehicle admitted while a crossing movement was still inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collision {
    pub vehicle:  VehicleId,
    pub movement: Movement,
    /// A crossing movement that was occupied at the time.
    pub against:  Movement,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} entered {} while {} was occupied", self.vehicle, self.movement, self.against)
    }
}

struct Table {
    inside:     [u32; Movement::COUNT],
    in_box:     u32,
    peak:       u32,
    collisions: Vec<Collision>,
}

pub struct CollisionMonitor {
    table: Mutex<Table>,
}

impl CollisionMonitor {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                inside:     [0; Movement::COUNT],
                in_box:     0,
                peak:       0,
                collisions: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `vehicle` inside the box on `movement` until the guard drops.
    pub fn occupy(&self, vehicle: VehicleId, movement: Movement) -> Occupancy<'_> {
        let mut t = self.lock();
        let crossing = movement
            .conflict_set()
            .iter()
            .find(|c| t.inside[c.index()] > 0);
        if let Some(against) = crossing {
            let collision = Collision { vehicle, movement, against };
            warn!(%collision, "collision");
            t.collisions.push(collision);
        }
        t.inside[movement.index()] += 1;
        t.in_box += 1;
        t.peak = t.peak.max(t.in_box);
        Occupancy { monitor: self, movement }
    }

    fn vacate(&self, movement: Movement) {
        let mut t = self.lock();
        t.inside[movement.index()] -= 1;
        t.in_box -= 1;
    }

    /// Most vehicles seen inside the box at once.
    pub fn peak(&self) -> u32 {
        self.lock().peak
    }

    pub fn collisions(&self) -> Vec<Collision> {
        self.lock().collisions.clone()
    }
}

impl Default for CollisionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// A vehicle's registration in the monitor.  Dropping it vacates the slot.
pub struct Occupancy<'a> {
    monitor:  &'a CollisionMonitor,
    movement: Movement,
}

impl Drop for Occupancy<'_> {
    fn drop(&mut self) {
        self.monitor.vacate(self.movement);
    }
}
