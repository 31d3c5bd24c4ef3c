//! Tests for the admission controller and lifecycle manager.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use xing_core::{Direction, Movement};

use crate::{ControlConfig, FairnessPolicy, IntersectionController, WakeStrategy};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Poll `cond` until it holds or five seconds pass.
fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

fn all_strategies() -> [ControlConfig; 3] {
    [
        ControlConfig::new().wake(WakeStrategy::Targeted),
        ControlConfig::new().wake(WakeStrategy::Broadcast),
        ControlConfig::new().wake(WakeStrategy::Polling { interval: Duration::from_millis(1) }),
    ]
}

/// Spawn a vehicle that enters `m`, reports admission, and exits when told.
fn held_vehicle<'s>(
    scope: &'s thread::Scope<'s, '_>,
    ix:    &'s IntersectionController,
    m:     Movement,
) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
    let (admitted_tx, admitted_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel::<()>();
    scope.spawn(move || {
        ix.enter_movement(m);
        admitted_tx.send(()).unwrap();
        go_rx.recv().unwrap();
        ix.exit_movement(m);
    });
    (admitted_rx, go_tx)
}

// ── Admission without conflict ────────────────────────────────────────────────

#[cfg(test)]
mod admission {
    use std::sync::{Arc, Barrier};

    use super::*;

    #[test]
    fn same_movement_enters_concurrently() {
        let ix = IntersectionController::new();
        let barrier = Barrier::new(2);
        thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    barrier.wait();
                    ix.enter(Direction::North, Direction::South);
                });
            }
        });
        let snap = ix.snapshot();
        assert_eq!(snap.active(Movement::N_S), 2);
        assert_eq!(snap.totals.blocked, 0);
        ix.exit(Direction::North, Direction::South);
        ix.exit(Direction::North, Direction::South);
        ix.shutdown();
    }

    #[test]
    fn many_vehicles_share_one_movement() {
        let ix = Arc::new(IntersectionController::new());
        let n = 16;
        let barrier = Arc::new(Barrier::new(n));
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let ix = Arc::clone(&ix);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    ix.enter_movement(Movement::E_W);
                    barrier.wait(); // everyone is inside at once
                    ix.exit_movement(Movement::E_W);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = ix.snapshot();
        assert_eq!(snap.peak(Movement::E_W), n as u32);
        assert!(snap.is_idle());
    }

    #[test]
    fn opposing_straights_are_admitted_together() {
        let ix = IntersectionController::new();
        ix.enter(Direction::North, Direction::South);
        assert!(ix.can_enter(Movement::S_N));
        ix.enter(Direction::South, Direction::North);
        let snap = ix.snapshot();
        assert_eq!(snap.active(Movement::N_S), 1);
        assert_eq!(snap.active(Movement::S_N), 1);
        assert!(snap.is_collision_free());
        ix.exit(Direction::South, Direction::North);
        ix.exit(Direction::North, Direction::South);
    }

    #[test]
    fn right_turn_beside_heavy_straight_traffic() {
        let ix = IntersectionController::new();
        for _ in 0..3 {
            ix.enter_movement(Movement::N_S);
        }
        ix.enter(Direction::East, Direction::North);
        let snap = ix.snapshot();
        assert_eq!(snap.active(Movement::N_S), 3);
        assert_eq!(snap.active(Movement::E_N), 1);
        assert_eq!(snap.totals.blocked, 0);
    }

    #[test]
    fn passage_guard_exits_on_drop() {
        let ix = IntersectionController::new();
        {
            let p = ix.pass(Direction::West, Direction::South);
            assert_eq!(p.movement(), Movement::W_S);
            assert_eq!(ix.snapshot().active(Movement::W_S), 1);
        }
        assert!(ix.is_idle());
    }
}

// ── Blocking and waking ───────────────────────────────────────────────────────

#[cfg(test)]
mod blocking {
    use super::*;

    /// `waiter` must block while `holder` is inside and be admitted when it
    /// leaves.
    fn blocks_until_exit(config: ControlConfig, holder: Movement, waiter: Movement) {
        let ix = IntersectionController::with_config(config);
        ix.enter_movement(holder);
        thread::scope(|s| {
            let (admitted, go) = held_vehicle(s, &ix, waiter);
            assert!(wait_until(|| ix.snapshot().waiting(waiter) == 1));
            assert!(admitted.try_recv().is_err(), "{waiter} crossed {holder}");

            ix.exit_movement(holder);
            admitted.recv_timeout(Duration::from_secs(5)).expect("never admitted");
            let snap = ix.snapshot();
            assert_eq!(snap.active(waiter), 1);
            assert_eq!(snap.waiting(waiter), 0);
            go.send(()).unwrap();
        });
        assert!(ix.is_idle());
        ix.shutdown();
    }

    #[test]
    fn straight_waits_for_crossing_straight() {
        for config in all_strategies() {
            blocks_until_exit(config, Movement::W_E, Movement::N_S);
        }
    }

    #[test]
    fn right_turn_waits_for_merging_left_turn() {
        for config in all_strategies() {
            blocks_until_exit(config, Movement::S_W, Movement::N_W);
        }
    }

    #[test]
    fn waiter_stays_parked_while_any_conflict_remains() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::W_E);
        ix.enter_movement(Movement::E_W);
        thread::scope(|s| {
            let (admitted, go) = held_vehicle(s, &ix, Movement::N_S);
            assert!(wait_until(|| ix.snapshot().waiting(Movement::N_S) == 1));

            ix.exit_movement(Movement::W_E);
            thread::sleep(Duration::from_millis(20));
            assert!(admitted.try_recv().is_err(), "admitted across E→W");

            ix.exit_movement(Movement::E_W);
            admitted.recv_timeout(Duration::from_secs(5)).expect("never admitted");
            go.send(()).unwrap();
        });
        assert!(ix.is_idle());
    }

    #[test]
    fn one_exit_releases_every_waiter_of_a_movement() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::N_E);
        thread::scope(|s| {
            let vehicles: Vec<_> = (0..4).map(|_| held_vehicle(s, &ix, Movement::S_N)).collect();
            assert!(wait_until(|| ix.snapshot().waiting(Movement::S_N) == 4));

            ix.exit_movement(Movement::N_E);
            for (admitted, _) in &vehicles {
                admitted.recv_timeout(Duration::from_secs(5)).expect("never admitted");
            }
            assert_eq!(ix.snapshot().active(Movement::S_N), 4);
            for (_, go) in &vehicles {
                go.send(()).unwrap();
            }
        });
        assert!(ix.is_idle());
    }
}

// ── Safety under load ─────────────────────────────────────────────────────────

#[cfg(test)]
mod stress {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use xing_core::{VehicleId, VehicleRng};

    use super::*;

    /// Independent occupancy table maintained only by admitted vehicles.
    struct Occupancy {
        inside:    Mutex<[u32; Movement::COUNT]>,
        collision: AtomicBool,
    }

    impl Occupancy {
        fn arrive(&self, m: Movement) {
            let mut inside = self.inside.lock().unwrap();
            if m.conflict_set().iter().any(|c| inside[c.index()] > 0) {
                self.collision.store(true, Ordering::SeqCst);
            }
            inside[m.index()] += 1;
        }

        fn leave(&self, m: Movement) {
            self.inside.lock().unwrap()[m.index()] -= 1;
        }
    }

    fn hammer(config: ControlConfig) {
        let ix = IntersectionController::with_config(config);
        let occ = Occupancy {
            inside:    Mutex::new([0; Movement::COUNT]),
            collision: AtomicBool::new(false),
        };

        thread::scope(|s| {
            for v in 0..24u32 {
                let (ix, occ) = (&ix, &occ);
                s.spawn(move || {
                    let mut rng = VehicleRng::new(99, VehicleId(v));
                    for _ in 0..40 {
                        let m = rng.movement([1.0, 1.0, 1.0]);
                        ix.enter_movement(m);
                        occ.arrive(m);
                        assert!(ix.snapshot().is_collision_free());
                        thread::sleep(Duration::from_micros(rng.gen_range(0..200)));
                        occ.leave(m);
                        ix.exit_movement(m);
                    }
                });
            }
        });

        assert!(!occ.collision.load(Ordering::SeqCst), "{config:?}");
        let snap = ix.snapshot();
        assert!(snap.is_idle());
        assert_eq!(snap.totals.admitted, 24 * 40);
        ix.shutdown();
    }

    #[test]
    fn no_collisions_with_targeted_wake() {
        hammer(ControlConfig::new());
    }

    #[test]
    fn no_collisions_with_broadcast_wake() {
        hammer(ControlConfig::new().wake(WakeStrategy::Broadcast));
    }

    #[test]
    fn no_collisions_with_polling_signaler() {
        hammer(ControlConfig::new().wake(WakeStrategy::Polling {
            interval: Duration::from_micros(200),
        }));
    }

    #[test]
    fn no_collisions_with_aging() {
        hammer(ControlConfig::new().fairness(FairnessPolicy::Aging { max_bypass: 3 }));
    }
}

// ── Aging policy ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod fairness {
    use super::*;

    #[test]
    fn without_aging_crossing_traffic_keeps_flowing() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::W_E);
        thread::scope(|s| {
            let (admitted, go) = held_vehicle(s, &ix, Movement::N_S);
            assert!(wait_until(|| ix.snapshot().waiting(Movement::N_S) == 1));

            for _ in 0..10 {
                ix.enter_movement(Movement::W_E);
            }
            assert!(ix.snapshot().starving.is_empty());
            for _ in 0..11 {
                ix.exit_movement(Movement::W_E);
            }
            admitted.recv_timeout(Duration::from_secs(5)).expect("never admitted");
            go.send(()).unwrap();
        });
    }

    #[test]
    fn starving_movement_holds_back_new_crossing_traffic() {
        let config = ControlConfig::new().fairness(FairnessPolicy::Aging { max_bypass: 2 });
        let ix = IntersectionController::with_config(config);
        ix.enter_movement(Movement::W_E);

        thread::scope(|s| {
            let (ns_admitted, ns_go) = held_vehicle(s, &ix, Movement::N_S);
            assert!(wait_until(|| ix.snapshot().waiting(Movement::N_S) == 1));

            // Two conflicting admissions overtake the N→S waiter.
            ix.enter_movement(Movement::W_E);
            ix.enter_movement(Movement::W_E);
            let snap = ix.snapshot();
            assert!(snap.starving.contains(Movement::N_S));
            assert!(!ix.can_enter(Movement::W_E));
            // Non-conflicting traffic is unaffected.
            assert!(ix.can_enter(Movement::E_N));

            let (we_admitted, we_go) = held_vehicle(s, &ix, Movement::W_E);
            assert!(wait_until(|| ix.snapshot().waiting(Movement::W_E) == 1));

            for _ in 0..3 {
                ix.exit_movement(Movement::W_E);
            }
            ns_admitted.recv_timeout(Duration::from_secs(5)).expect("N→S never admitted");
            let snap = ix.snapshot();
            assert!(snap.starving.is_empty());
            assert_eq!(snap.waiting(Movement::W_E), 1);
            assert!(we_admitted.try_recv().is_err());

            ns_go.send(()).unwrap();
            we_admitted.recv_timeout(Duration::from_secs(5)).expect("W→E never admitted");
            we_go.send(()).unwrap();
        });
        assert!(ix.is_idle());
    }
}

// ── Contract and lifecycle violations ─────────────────────────────────────────

#[cfg(test)]
mod contract {
    use super::*;
    use crate::ControlError;

    #[test]
    #[should_panic(expected = "without a matching enter")]
    fn exit_without_enter_panics() {
        let ix = IntersectionController::new();
        ix.exit(Direction::North, Direction::East);
    }

    #[test]
    fn failed_exit_leaves_counts_untouched() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::N_S);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ix.exit_movement(Movement::S_N);
        }));
        assert!(result.is_err());
        // The poisoned lock is recovered and the state is intact.
        assert_eq!(ix.snapshot().active(Movement::N_S), 1);
        ix.exit_movement(Movement::N_S);
        assert!(ix.is_idle());
    }

    #[test]
    #[should_panic(expected = "u-turn")]
    fn u_turn_panics() {
        let ix = IntersectionController::new();
        ix.enter(Direction::South, Direction::South);
    }

    #[test]
    #[should_panic(expected = "shut down")]
    fn enter_after_shutdown_panics() {
        let ix = IntersectionController::new();
        ix.shutdown();
        ix.enter_movement(Movement::N_S);
    }

    #[test]
    fn shutdown_while_admitted_is_refused() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::S_E);
        assert_eq!(ix.try_shutdown(), Err(ControlError::Busy { active: 1, waiting: 0 }));
        assert!(!ix.is_shut_down());
        ix.exit_movement(Movement::S_E);
        assert_eq!(ix.try_shutdown(), Ok(()));
        assert!(ix.is_shut_down());
    }

    #[test]
    fn shutdown_while_parked_is_refused() {
        let ix = IntersectionController::new();
        ix.enter_movement(Movement::W_E);
        thread::scope(|s| {
            let (admitted, go) = held_vehicle(s, &ix, Movement::N_S);
            assert!(wait_until(|| ix.snapshot().waiting(Movement::N_S) == 1));
            assert_eq!(ix.try_shutdown(), Err(ControlError::Busy { active: 1, waiting: 1 }));
            ix.exit_movement(Movement::W_E);
            admitted.recv_timeout(Duration::from_secs(5)).unwrap();
            go.send(()).unwrap();
        });
        ix.shutdown();
    }

    #[test]
    fn repeated_shutdown_is_harmless() {
        for config in all_strategies() {
            let ix = IntersectionController::with_config(config);
            ix.enter_movement(Movement::N_W);
            ix.exit_movement(Movement::N_W);
            ix.shutdown();
            ix.shutdown();
            assert!(ix.is_shut_down());
        }
    }
}

// ── Process-wide singleton ────────────────────────────────────────────────────

#[cfg(test)]
mod singleton {
    use std::sync::{Mutex, PoisonError};

    use super::*;
    use crate::{ControlError, lifecycle};

    /// Tests touching the global controller run one at a time.
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn full_lifecycle() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);

        assert!(lifecycle::controller().is_none());
        assert_eq!(lifecycle::try_controller().err(), Some(ControlError::NotInitialized));
        let handle = lifecycle::initialize();
        assert_eq!(
            lifecycle::try_initialize_with(ControlConfig::default()).err(),
            Some(ControlError::AlreadyInitialized)
        );

        lifecycle::enter(Direction::North, Direction::South);
        lifecycle::enter(Direction::South, Direction::North);
        assert_eq!(handle.snapshot().total_active(), 2);
        assert!(matches!(lifecycle::try_shutdown(), Err(ControlError::Busy { .. })));
        assert!(lifecycle::controller().is_some());

        lifecycle::exit(Direction::North, Direction::South);
        lifecycle::exit(Direction::South, Direction::North);
        lifecycle::shutdown();
        assert!(handle.is_shut_down());
        assert!(lifecycle::controller().is_none());

        // Teardown twice, then a fresh run.
        lifecycle::shutdown();
        let again = lifecycle::initialize_with(ControlConfig::new().wake(WakeStrategy::Broadcast));
        assert_eq!(again.config().wake, WakeStrategy::Broadcast);
        lifecycle::shutdown();
    }

    #[test]
    #[should_panic(expected = "enter: intersection controller is not initialized")]
    fn enter_before_initialize_panics() {
        let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        lifecycle::enter(Direction::East, Direction::West);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;
    use crate::ControlError;

    #[test]
    fn defaults_validate() {
        assert_eq!(ControlConfig::default().validate(), Ok(()));
        let ok = ControlConfig::new()
            .wake(WakeStrategy::Polling { interval: Duration::from_micros(1) })
            .fairness(FairnessPolicy::Aging { max_bypass: 1 });
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn zero_polling_interval_rejected() {
        let config = ControlConfig::new().wake(WakeStrategy::Polling { interval: Duration::ZERO });
        assert!(matches!(config.validate(), Err(ControlError::InvalidConfig(_))));
    }

    #[test]
    fn zero_aging_limit_rejected() {
        let config = ControlConfig::new().fairness(FairnessPolicy::Aging { max_bypass: 0 });
        assert!(matches!(config.validate(), Err(ControlError::InvalidConfig(_))));
    }
}
