//! Controller configuration: how waiters are woken and whether long waits
//! are bounded.

use std::time::Duration;

use crate::{ControlError, ControlResult};

/// How `exit` hands the intersection to blocked vehicles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WakeStrategy {
    /// After each exit, broadcast only on movements that have waiters and
    /// are now admissible.
    #[default]
    Targeted,

    /// After each exit, broadcast on every movement that has waiters and let
    /// each re-check.  Same outcome as `Targeted` with spurious wake-ups.
    Broadcast,

    /// A background signaler thread re-evaluates waiters every `interval`
    /// under the lock; `exit` wakes nobody itself.  `interval` must be
    /// non-zero.
    Polling { interval: Duration },
}

/// Starvation bound for movements that keep losing to conflicting traffic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FairnessPolicy {
    /// Admit whatever is safe.  A steady stream of one movement can starve a
    /// conflicting one indefinitely.
    #[default]
    None,

    /// Once `max_bypass` conflicting admissions have overtaken a movement's
    /// waiters, hold back new traffic that conflicts with it until those
    /// waiters are admitted.  `max_bypass` must be at least 1.
    Aging { max_bypass: u32 },
}

/// Configuration for an [`IntersectionController`][crate::IntersectionController].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlConfig {
    pub wake:     WakeStrategy,
    pub fairness: FairnessPolicy,
}

impl ControlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(mut self, wake: WakeStrategy) -> Self {
        self.wake = wake;
        self
    }

    pub fn fairness(mut self, fairness: FairnessPolicy) -> Self {
        self.fairness = fairness;
        self
    }

    /// Reject settings the controller cannot honour: a zero polling
    /// interval (the signaler would spin) or an aging limit of zero (the
    /// first bypass is always counted before a mark can be set).
    pub fn validate(&self) -> ControlResult<()> {
        if let WakeStrategy::Polling { interval } = self.wake {
            if interval.is_zero() {
                return Err(ControlError::InvalidConfig("polling interval must be non-zero"));
            }
        }
        if let FairnessPolicy::Aging { max_bypass: 0 } = self.fairness {
            return Err(ControlError::InvalidConfig("aging max_bypass must be at least 1"));
        }
        Ok(())
    }
}
