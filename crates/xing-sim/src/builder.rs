//! Fluent builder for constructing a [`Simulation`].

use xing_control::ControlConfig;

use crate::{DelayRange, SimConfig, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// Starts from a full [`SimConfig`] and lets callers override individual
/// fields.  `build` validates the result.
///
/// | Method            | Overrides                   |
/// |-------------------|-----------------------------|
/// | `.vehicles(n)`    | `SimConfig::vehicles`       |
/// | `.trips(n)`       | `trips_per_vehicle`         |
/// | `.seed(s)`        | `seed`                      |
/// | `.arrival(r)`     | `arrival_delay`             |
/// | `.transit(r)`     | `transit_time`              |
/// | `.turn_weights(w)`| `turn_weights`              |
/// | `.control(c)`     | `control`                   |
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(SimConfig::default())
///     .vehicles(20)
///     .control(ControlConfig::new().wake(WakeStrategy::Broadcast))
///     .build()?;
/// let report = sim.run(&NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn vehicles(mut self, n: usize) -> Self {
        self.config.vehicles = n;
        self
    }

    pub fn trips(mut self, n: u32) -> Self {
        self.config.trips_per_vehicle = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn arrival(mut self, range: DelayRange) -> Self {
        self.config.arrival_delay = range;
        self
    }

    pub fn transit(mut self, range: DelayRange) -> Self {
        self.config.transit_time = range;
        self
    }

    /// Relative `[straight, right, left]` likelihoods.
    pub fn turn_weights(mut self, weights: [f64; 3]) -> Self {
        self.config.turn_weights = weights;
        self
    }

    pub fn control(mut self, control: ControlConfig) -> Self {
        self.config.control = control;
        self
    }

    /// Validate and produce the [`Simulation`].
    ///
    /// # Errors
    ///
    /// [`SimError::Config`][crate::SimError::Config] if the configuration
    /// cannot be run.
    pub fn build(self) -> SimResult<Simulation> {
        Simulation::new(self.config)
    }
}

impl Default for SimBuilder {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
