//! Annealing configuration and cooling schedules.

use crate::{Error, Result};

/// Cooling schedule for temperature reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoolingSchedule {
    /// Geometric cooling: `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling from the initial to the minimum temperature over
    /// `max_iterations / iterations_per_temperature` steps.
    Linear,
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Configuration for the [`Annealer`](super::Annealer).
///
/// The defaults describe the rearrangement search: start at 100.0, cool by
/// 0.95 after every move, stop after 1000 moves.
///
/// # Examples
///
/// ```
/// use u_stowage::anneal::{AnnealConfig, CoolingSchedule};
///
/// let config = AnnealConfig::default()
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
///     .with_max_iterations(5000)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The run stops once the temperature falls to this value.
    pub min_temperature: f64,

    pub cooling: CoolingSchedule,

    /// Number of moves at each temperature level.
    pub iterations_per_temperature: usize,

    /// Maximum total moves. 0 = no limit.
    pub max_iterations: usize,

    /// Stop as soon as the best cost drops strictly below this value.
    pub target_cost: Option<f64>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: 1e-30,
            cooling: CoolingSchedule::default(),
            iterations_per_temperature: 1,
            max_iterations: 1000,
            target_cost: None,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_target_cost(mut self, cost: f64) -> Self {
        self.target_cost = Some(cost);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature > 0.0) {
            return Err(Error::ConfigError(
                "initial_temperature must be positive".into(),
            ));
        }
        if !(self.min_temperature > 0.0) {
            return Err(Error::ConfigError("min_temperature must be positive".into()));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(Error::ConfigError(
                "min_temperature must be less than initial_temperature".into(),
            ));
        }
        if self.iterations_per_temperature == 0 {
            return Err(Error::ConfigError(
                "iterations_per_temperature must be at least 1".into(),
            ));
        }
        if let CoolingSchedule::Geometric { alpha } = self.cooling {
            if alpha <= 0.0 || alpha >= 1.0 {
                return Err(Error::ConfigError(format!(
                    "geometric alpha must be in (0, 1), got {alpha}"
                )));
            }
        }
        Ok(())
    }
}
