//! Simulated annealing.
//!
//! A single-solution local search that accepts worsening moves with a
//! probability that shrinks as the temperature cools. The rearrangement
//! planner runs it over subsets of movable items; the runner itself knows
//! nothing about cargo.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod runner;
mod types;

pub use config::{AnnealConfig, CoolingSchedule};
pub use runner::{AnnealResult, Annealer};
pub use types::AnnealProblem;
