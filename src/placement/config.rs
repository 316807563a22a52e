//! Placement engine configuration.

use crate::geometry::GridResolution;
use crate::rearrangement::RearrangementConfig;
use crate::{Error, Result};

/// Weights of the additive placement score.
///
/// `priority / 100 + zone_bonus (preferred zone) + accessibility * acc
/// + min(volume_factor * item_volume / container_volume, volume_cap)
/// + contact * touching_walls / 6`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Added when the container is in the item's preferred zone.
    pub zone_bonus: f64,
    /// Weight of the front-depth term.
    pub accessibility: f64,
    /// Scales the share of container volume the item fills.
    pub volume_factor: f64,
    /// Upper bound of the volume term.
    pub volume_cap: f64,
    /// Weight of the wall and neighbour contact term.
    pub contact: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            zone_bonus: 0.5,
            accessibility: 0.3,
            volume_factor: 10.0,
            volume_cap: 0.2,
            contact: 0.1,
        }
    }
}

/// Configuration for [`PlacementEngine`](super::PlacementEngine).
///
/// # Examples
///
/// ```
/// use u_stowage::geometry::GridResolution;
/// use u_stowage::placement::PlacementConfig;
///
/// let config = PlacementConfig::default()
///     .with_resolution(GridResolution::Fixed(2.0))
///     .with_rearrangement(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementConfig {
    /// Cell size policy of the occupancy grids.
    pub resolution: GridResolution,

    pub weights: ScoreWeights,

    /// The search stops once a candidate scores within this distance of
    /// the best score the orientation can reach.
    pub near_optimal_tolerance: f64,

    /// Step of the coarse fallback sweep. `None` derives it from the grid
    /// cell and the item size.
    pub sweep_step: Option<f64>,

    /// Skip containers whose weight limit the item would exceed.
    pub enforce_weight_limit: bool,

    /// Try displacing lower-priority items when nothing fits directly.
    pub allow_rearrangement: bool,

    /// Maximum number of displacement slots tried per container.
    pub rearrangement_attempts: usize,

    pub rearrangement: RearrangementConfig,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            resolution: GridResolution::default(),
            weights: ScoreWeights::default(),
            near_optimal_tolerance: 0.01,
            sweep_step: None,
            enforce_weight_limit: true,
            allow_rearrangement: true,
            rearrangement_attempts: 8,
            rearrangement: RearrangementConfig::default(),
        }
    }
}

impl PlacementConfig {
    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_near_optimal_tolerance(mut self, tolerance: f64) -> Self {
        self.near_optimal_tolerance = tolerance;
        self
    }

    pub fn with_sweep_step(mut self, step: f64) -> Self {
        self.sweep_step = Some(step);
        self
    }

    pub fn with_weight_limit(mut self, enforce: bool) -> Self {
        self.enforce_weight_limit = enforce;
        self
    }

    pub fn with_rearrangement(mut self, allow: bool) -> Self {
        self.allow_rearrangement = allow;
        self
    }

    pub fn with_rearrangement_attempts(mut self, attempts: usize) -> Self {
        self.rearrangement_attempts = attempts;
        self
    }

    pub fn with_rearrangement_config(mut self, config: RearrangementConfig) -> Self {
        self.rearrangement = config;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.resolution.validate()?;
        if self.near_optimal_tolerance < 0.0 {
            return Err(Error::ConfigError(format!(
                "near_optimal_tolerance must be non-negative, got {}",
                self.near_optimal_tolerance
            )));
        }
        if let Some(step) = self.sweep_step {
            if !(step > 0.0) {
                return Err(Error::ConfigError(format!(
                    "sweep_step must be positive, got {step}"
                )));
            }
        }
        let w = &self.weights;
        if [w.zone_bonus, w.accessibility, w.volume_factor, w.volume_cap, w.contact]
            .iter()
            .any(|v| *v < 0.0 || !v.is_finite())
        {
            return Err(Error::ConfigError(
                "score weights must be finite and non-negative".into(),
            ));
        }
        self.rearrangement.validate()
    }
}
