//! The `Simulation` struct and its vehicle threads.

use std::thread;
use std::time::Instant;

use tracing::{debug, info};
use xing_control::{IntersectionController, lifecycle};
use xing_core::{Movement, VehicleId, VehicleRng};

use crate::report::MovementStats;
use crate::{CollisionMonitor, SimConfig, SimError, SimObserver, SimReport, SimResult, TripRecord};

/// Per-vehicle tally, merged after the threads join.
type Tally = [MovementStats; Movement::COUNT];

/// The simulation driver.
///
/// Each run spawns one thread per vehicle.  A vehicle repeatedly:
///
/// 1. sleeps a random arrival delay and draws a movement;
/// 2. calls `enter` (blocking while crossing traffic is inside);
/// 3. registers with the [`CollisionMonitor`], sleeps its transit time,
///    deregisters;
/// 4. calls `exit`.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    pub config: SimConfig,
}

impl Simulation {
    /// Validate `config` and wrap it.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run on a fresh controller owned by this call.
    pub fn run<O: SimObserver>(&self, observer: &O) -> SimResult<SimReport> {
        let controller = IntersectionController::with_config(self.config.control);
        let outcome = self.drive_all(&controller, observer);
        // Every vehicle has been joined and its guards dropped, so a busy
        // controller here means a driver bug.
        controller.try_shutdown()?;
        self.finish(outcome, &controller, observer)
    }

    /// Run on the process-wide controller from
    /// [`xing_control::lifecycle`]: initialize before the first vehicle
    /// arrives, shut down after the last one leaves.
    ///
    /// Fails with a controller error if the singleton is already live.
    pub fn run_global<O: SimObserver>(&self, observer: &O) -> SimResult<SimReport> {
        let controller = lifecycle::try_initialize_with(self.config.control)?;
        let outcome = self.drive_all(&controller, observer);
        // As in `run`, only a driver bug leaves vehicles inside here.
        lifecycle::try_shutdown()?;
        self.finish(outcome, &controller, observer)
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Spawn every vehicle, join them all, and fold their tallies.
    fn drive_all<O: SimObserver>(
        &self,
        controller: &IntersectionController,
        observer:   &O,
    ) -> DriveOutcome {
        let monitor = CollisionMonitor::new();
        let started = Instant::now();
        info!(
            vehicles = self.config.vehicles,
            trips = self.config.total_trips(),
            "simulation started"
        );

        let mut error = None;
        let mut movements: Tally = Default::default();

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.config.vehicles);
            for v in 0..self.config.vehicles {
                // `validate` bounds `vehicles` by `u32::MAX`.
                let vehicle = VehicleId(v as u32);
                let (monitor, config) = (&monitor, &self.config);
                let spawned = thread::Builder::new()
                    .name(format!("vehicle-{v}"))
                    .spawn_scoped(s, move || drive(vehicle, config, controller, monitor, observer));
                match spawned {
                    Ok(h) => handles.push((vehicle, h)),
                    Err(e) => {
                        error = Some(SimError::Spawn(e));
                        break;
                    }
                }
            }

            for (vehicle, handle) in handles {
                match handle.join() {
                    Ok(tally) => {
                        for (acc, s) in movements.iter_mut().zip(&tally) {
                            acc.merge(s);
                        }
                    }
                    Err(_) => {
                        error.get_or_insert(SimError::VehiclePanicked(vehicle));
                    }
                }
            }
        });

        DriveOutcome {
            error,
            movements,
            elapsed:     started.elapsed(),
            peak_in_box: monitor.peak(),
            collisions:  monitor.collisions(),
        }
    }

    fn finish<O: SimObserver>(
        &self,
        outcome:    DriveOutcome,
        controller: &IntersectionController,
        observer:   &O,
    ) -> SimResult<SimReport> {
        if let Some(e) = outcome.error {
            return Err(e);
        }
        if let Some(&first) = outcome.collisions.first() {
            return Err(SimError::Collision { count: outcome.collisions.len(), first });
        }

        let report = SimReport {
            vehicles:    self.config.vehicles,
            trips:       outcome.movements.iter().map(|s| s.trips).sum(),
            elapsed:     outcome.elapsed,
            movements:   outcome.movements,
            peak_in_box: outcome.peak_in_box,
            controller:  controller.snapshot().totals,
        };
        info!(
            trips = report.trips,
            elapsed_ms = report.elapsed.as_millis() as u64,
            peak_in_box = report.peak_in_box,
            "simulation complete"
        );
        observer.on_sim_end(&report);
        Ok(report)
    }
}

struct DriveOutcome {
    error:       Option<SimError>,
    movements:   Tally,
    elapsed:     std::time::Duration,
    peak_in_box: u32,
    collisions:  Vec<crate::Collision>,
}

/// Body of one vehicle thread.
///
/// The intersection is held through guards, so a panicking observer still
/// exits the box and cannot strand the other vehicles.
fn drive<O: SimObserver>(
    vehicle:    VehicleId,
    config:     &SimConfig,
    controller: &IntersectionController,
    monitor:    &CollisionMonitor,
    observer:   &O,
) -> Tally {
    let mut rng = VehicleRng::new(config.seed, vehicle);
    let mut tally: Tally = Default::default();

    for trip in 0..config.trips_per_vehicle {
        thread::sleep(config.arrival_delay.sample(&mut rng));
        let movement = rng.movement(config.turn_weights);
        observer.on_arrive(vehicle, movement);

        let requested = Instant::now();
        let passage = controller.pass(movement.origin(), movement.destination());
        let waited = requested.elapsed();
        let occupancy = monitor.occupy(vehicle, movement);
        observer.on_enter(vehicle, movement, waited);

        let transit = config.transit_time.sample(&mut rng);
        thread::sleep(transit);
        drop(occupancy);
        drop(passage);

        let record = TripRecord { vehicle, trip, movement, waited, transit };
        debug!(%vehicle, %movement, waited_us = waited.as_micros() as u64, "trip done");
        tally[movement.index()].record(&record);
        observer.on_exit(&record);
    }
    tally
}
