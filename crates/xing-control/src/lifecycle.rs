//! Process-wide controller lifetime.
//!
//! A simulation driver that thinks in terms of free functions calls
//! [`initialize`] once before the first vehicle arrives, [`enter`]/[`exit`]
//! from each vehicle thread, and [`shutdown`] once every vehicle has left.
//! The singleton lock is only held long enough to clone the `Arc`; vehicles
//! never block while holding it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};
use xing_core::Direction;

use crate::{ControlConfig, ControlError, ControlResult, IntersectionController};

static CONTROLLER: Mutex<Option<Arc<IntersectionController>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<IntersectionController>>> {
    CONTROLLER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create the singleton with `config`.
///
/// Fails with [`ControlError::AlreadyInitialized`] if a controller exists,
/// or [`ControlError::InvalidConfig`] if `config` does not validate.
pub fn try_initialize_with(config: ControlConfig) -> ControlResult<Arc<IntersectionController>> {
    config.validate()?;
    let mut slot = slot();
    if slot.is_some() {
        return Err(ControlError::AlreadyInitialized);
    }
    let controller = Arc::new(IntersectionController::with_config(config));
    *slot = Some(Arc::clone(&controller));
    info!(?config, "intersection initialized");
    Ok(controller)
}

/// Create the singleton with `config`.
///
/// # Panics
/// Panics if a controller already exists.
pub fn initialize_with(config: ControlConfig) -> Arc<IntersectionController> {
    match try_initialize_with(config) {
        Ok(c) => c,
        Err(e) => panic!("intersection initialize: {e}"),
    }
}

/// Create the singleton with the default configuration.
///
/// # Panics
/// Panics if a controller already exists.
pub fn initialize() -> Arc<IntersectionController> {
    initialize_with(ControlConfig::default())
}

/// A handle to the singleton, if one is live.
pub fn controller() -> Option<Arc<IntersectionController>> {
    slot().clone()
}

/// A handle to the singleton.
///
/// Fails with [`ControlError::NotInitialized`] if none is live.
pub fn try_controller() -> ControlResult<Arc<IntersectionController>> {
    controller().ok_or(ControlError::NotInitialized)
}

fn expect_controller(call: &str) -> Arc<IntersectionController> {
    match try_controller() {
        Ok(c) => c,
        Err(e) => panic!("{call}: {e}"),
    }
}

/// Block until `origin → destination` is safe, then enter.
///
/// # Panics
/// Panics if the singleton is not initialized, or on any contract violation
/// listed on [`IntersectionController::enter`].
pub fn enter(origin: Direction, destination: Direction) {
    expect_controller("enter").enter(origin, destination);
}

/// Leave after transiting `origin → destination`.
///
/// # Panics
/// Panics if the singleton is not initialized, or on any contract violation
/// listed on [`IntersectionController::exit`].
pub fn exit(origin: Direction, destination: Direction) {
    expect_controller("exit").exit(origin, destination);
}

/// Tear the singleton down.
///
/// Fails with [`ControlError::Busy`] (leaving the controller in place) if
/// any vehicle is admitted or parked.  With no live controller this is a
/// no-op, so repeated shutdowns are harmless.
pub fn try_shutdown() -> ControlResult<()> {
    let mut slot = slot();
    match slot.as_ref() {
        None => {
            debug!("intersection shutdown with no live controller");
            Ok(())
        }
        Some(c) => {
            c.try_shutdown()?;
            *slot = None;
            Ok(())
        }
    }
}

/// Tear the singleton down.
///
/// # Panics
/// Panics if any vehicle is still admitted or parked.
pub fn shutdown() {
    if let Err(e) = try_shutdown() {
        panic!("intersection shutdown: {e}");
    }
}
