//! Rearrangement configuration.

use crate::anneal::AnnealConfig;
use crate::{Error, Result};

/// Configuration for the rearrangement planner.
///
/// # Examples
///
/// ```
/// use u_stowage::rearrangement::RearrangementConfig;
///
/// let config = RearrangementConfig::default()
///     .with_seed(42)
///     .with_restarts(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RearrangementConfig {
    /// Annealing schedule. The target cost is derived from
    /// `early_exit_score` and overrides any value set here.
    pub anneal: AnnealConfig,

    /// The greedy starting selection frees this multiple of the needed
    /// volume.
    pub volume_buffer: f64,

    /// Plans scoring below this are rejected.
    pub acceptance_floor: f64,

    /// Annealing stops once the best score exceeds this.
    pub early_exit_score: f64,

    /// If the new items need at least this fraction of the container
    /// volume, every occupant is eligible regardless of priority.
    pub bulk_need_ratio: f64,

    /// Maximum number of movable candidates kept after ranking.
    pub candidate_cap: usize,

    /// Move count at which the movement factor bottoms out.
    pub movement_normaliser: f64,

    /// Independent annealing runs; the best plan wins. The effective
    /// count is capped at twice the number of candidates.
    pub restarts: usize,
}

impl Default for RearrangementConfig {
    fn default() -> Self {
        Self {
            anneal: AnnealConfig::default(),
            volume_buffer: 1.2,
            acceptance_floor: 0.5,
            early_exit_score: 0.9,
            bulk_need_ratio: 0.3,
            candidate_cap: 20,
            movement_normaliser: 20.0,
            restarts: 10,
        }
    }
}

impl RearrangementConfig {
    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.anneal.seed = Some(seed);
        self
    }

    pub fn with_volume_buffer(mut self, buffer: f64) -> Self {
        self.volume_buffer = buffer;
        self
    }

    pub fn with_acceptance_floor(mut self, floor: f64) -> Self {
        self.acceptance_floor = floor;
        self
    }

    pub fn with_early_exit_score(mut self, score: f64) -> Self {
        self.early_exit_score = score;
        self
    }

    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Annealing config with the early-exit target applied.
    pub(crate) fn effective_anneal(&self) -> AnnealConfig {
        self.anneal.clone().with_target_cost(-self.early_exit_score)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.anneal.validate()?;
        if self.volume_buffer < 1.0 {
            return Err(Error::ConfigError(format!(
                "volume_buffer must be >= 1.0, got {}",
                self.volume_buffer
            )));
        }
        if !(0.0..=1.0).contains(&self.acceptance_floor) {
            return Err(Error::ConfigError(format!(
                "acceptance_floor must be in [0, 1], got {}",
                self.acceptance_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.bulk_need_ratio) {
            return Err(Error::ConfigError(format!(
                "bulk_need_ratio must be in [0, 1], got {}",
                self.bulk_need_ratio
            )));
        }
        if self.candidate_cap == 0 {
            return Err(Error::ConfigError("candidate_cap must be at least 1".into()));
        }
        if !(self.movement_normaliser > 0.0) {
            return Err(Error::ConfigError(
                "movement_normaliser must be positive".into(),
            ));
        }
        if self.restarts == 0 {
            return Err(Error::ConfigError("restarts must be at least 1".into()));
        }
        Ok(())
    }
}
