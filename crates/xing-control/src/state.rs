//! `AdmissionState` — who is in the box, who is waiting, and the bookkeeping
//! for the aging policy.
//!
//! Every method here assumes the caller holds the controller's lock; the
//! struct itself has no interior synchronisation.

use xing_core::{ConflictSet, Movement};

use crate::FairnessPolicy;

/// Monotonic counters, never reset during a controller's life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    /// Successful `enter` calls.
    pub admitted: u64,
    /// `enter` calls that had to park at least once.
    pub blocked:  u64,
    /// Broadcasts issued on movement condition variables.
    pub wakeups:  u64,
}

pub(crate) struct AdmissionState {
    /// Vehicles currently transiting each movement.
    active:   [u32; Movement::COUNT],
    /// Threads inside `enter` for each movement that have not been admitted.
    waiting:  [u32; Movement::COUNT],
    /// Movements with `active > 0`, kept in step with `active`.
    occupied: ConflictSet,
    /// Highest simultaneous `active` value seen per movement.
    peak:     [u32; Movement::COUNT],

    /// Conflicting admissions since each movement's waiters started waiting.
    bypassed:       [u32; Movement::COUNT],
    /// Order in which movements crossed the aging limit.
    starving_since: [Option<u64>; Movement::COUNT],
    next_mark:      u64,

    pub(crate) totals: Totals,
    /// Set by shutdown.  Read only under the lock.
    pub(crate) closed: bool,
}

impl AdmissionState {
    pub(crate) fn new() -> Self {
        Self {
            active:         [0; Movement::COUNT],
            waiting:        [0; Movement::COUNT],
            occupied:       ConflictSet::EMPTY,
            peak:           [0; Movement::COUNT],
            bypassed:       [0; Movement::COUNT],
            starving_since: [None; Movement::COUNT],
            next_mark:      0,
            totals:         Totals::default(),
            closed:         false,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn active(&self, m: Movement) -> u32 {
        self.active[m.index()]
    }

    /// `true` if no active movement crosses `m`.
    #[inline]
    pub(crate) fn can_enter(&self, m: Movement) -> bool {
        !self.occupied.intersects(m.conflict_set())
    }

    /// `true` if the aging policy reserves the box for a starving movement
    /// that crosses `m` and outranks it.
    fn held_back(&self, m: Movement, policy: FairnessPolicy) -> bool {
        if matches!(policy, FairnessPolicy::None) {
            return false;
        }
        let own = self.starving_since[m.index()];
        m.conflict_set().iter().any(|s| match (self.starving_since[s.index()], own) {
            (Some(_), None)          => true,
            (Some(theirs), Some(ours)) => theirs < ours,
            (None, _)                => false,
        })
    }

    /// Safe to admit `m` right now under `policy`.
    pub(crate) fn admissible(&self, m: Movement, policy: FairnessPolicy) -> bool {
        self.can_enter(m) && !self.held_back(m, policy)
    }

    /// Movements with at least one parked thread.
    pub(crate) fn waiters(&self) -> ConflictSet {
        Movement::ALL
            .into_iter()
            .filter(|m| self.waiting[m.index()] > 0)
            .collect()
    }

    /// Movements with parked threads that would be admitted if woken now.
    pub(crate) fn ready(&self, policy: FairnessPolicy) -> ConflictSet {
        self.waiters()
            .iter()
            .filter(|&m| self.admissible(m, policy))
            .collect()
    }

    pub(crate) fn total_active(&self) -> u32 {
        self.active.iter().sum()
    }

    pub(crate) fn total_waiting(&self) -> u32 {
        self.waiting.iter().sum()
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.occupied.is_empty() && self.total_waiting() == 0
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// A thread for `m` is about to park for the first time in this `enter`.
    pub(crate) fn begin_wait(&mut self, m: Movement) {
        self.waiting[m.index()] += 1;
        self.totals.blocked += 1;
    }

    /// A parked thread for `m` is leaving the wait loop to be admitted.
    ///
    /// Returns `true` if this cleared a starvation mark, which may release
    /// movements the mark was holding back.
    pub(crate) fn end_wait(&mut self, m: Movement) -> bool {
        let i = m.index();
        debug_assert!(self.waiting[i] > 0, "end_wait without begin_wait for {m}");
        self.waiting[i] = self.waiting[i].saturating_sub(1);
        if self.waiting[i] > 0 {
            return false;
        }
        self.bypassed[i] = 0;
        self.starving_since[i].take().is_some()
    }

    /// Count a vehicle into the box.  The caller has checked `admissible`.
    pub(crate) fn admit(&mut self, m: Movement, policy: FairnessPolicy) {
        let i = m.index();
        debug_assert!(self.can_enter(m), "admitting {m} across active traffic");
        self.active[i] += 1;
        self.occupied = self.occupied.with(m);
        self.peak[i] = self.peak[i].max(self.active[i]);
        self.totals.admitted += 1;

        if let FairnessPolicy::Aging { max_bypass } = policy {
            for w in self.waiters().iter().filter(|&w| m.conflicts_with(w)) {
                let j = w.index();
                self.bypassed[j] += 1;
                if self.bypassed[j] >= max_bypass && self.starving_since[j].is_none() {
                    self.starving_since[j] = Some(self.next_mark);
                    self.next_mark += 1;
                }
            }
        }
    }

    /// Count a vehicle out of the box.
    ///
    /// # Panics
    /// Panics, leaving the state untouched, if no vehicle is transiting `m`.
    pub(crate) fn release(&mut self, m: Movement) {
        let i = m.index();
        assert!(
            self.active[i] > 0,
            "exit({}, {}) without a matching enter: no vehicle is transiting {m}",
            m.origin(),
            m.destination(),
        );
        self.active[i] -= 1;
        if self.active[i] == 0 {
            self.occupied = self.occupied.without(m);
        }
    }

    // ── Snapshot ──────────────────────────────────────────────────────────

    pub(crate) fn snapshot(&self) -> AdmissionSnapshot {
        AdmissionSnapshot {
            active:   self.active,
            waiting:  self.waiting,
            peak:     self.peak,
            starving: Movement::ALL
                .into_iter()
                .filter(|m| self.starving_since[m.index()].is_some())
                .collect(),
            totals:   self.totals,
        }
    }
}

// ── AdmissionSnapshot ─────────────────────────────────────────────────────────

/// A consistent copy of the admission state taken under the lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    pub active:   [u32; Movement::COUNT],
    pub waiting:  [u32; Movement::COUNT],
    pub peak:     [u32; Movement::COUNT],
    /// Movements currently marked by the aging policy.
    pub starving: ConflictSet,
    pub totals:   Totals,
}

impl AdmissionSnapshot {
    #[inline]
    pub fn active(&self, m: Movement) -> u32 {
        self.active[m.index()]
    }

    #[inline]
    pub fn waiting(&self, m: Movement) -> u32 {
        self.waiting[m.index()]
    }

    #[inline]
    pub fn peak(&self, m: Movement) -> u32 {
        self.peak[m.index()]
    }

    /// Movements with at least one vehicle in the box.
    pub fn occupied(&self) -> ConflictSet {
        Movement::ALL
            .into_iter()
            .filter(|&m| self.active(m) > 0)
            .collect()
    }

    pub fn total_active(&self) -> u32 {
        self.active.iter().sum()
    }

    pub fn total_waiting(&self) -> u32 {
        self.waiting.iter().sum()
    }

    pub fn is_idle(&self) -> bool {
        self.total_active() == 0 && self.total_waiting() == 0
    }

    /// `true` if no two crossing movements are both occupied.
    pub fn is_collision_free(&self) -> bool {
        let occupied = self.occupied();
        occupied.iter().all(|m| !occupied.intersects(m.conflict_set()))
    }
}
