//! Annealing loop.

use super::config::{AnnealConfig, CoolingSchedule};
use super::types::AnnealProblem;
use crate::random::rng_from;
use crate::Result;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S: Clone> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Total number of neighbor evaluations.
    pub iterations: usize,

    /// Temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of improving moves.
    pub improving_moves: usize,

    /// Whether the target cost was reached.
    pub reached_target: bool,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost sampled at regular intervals.
    pub cost_history: Vec<f64>,
}

/// Executes simulated annealing.
pub struct Annealer;

impl Annealer {
    /// Runs with the RNG described by `config.seed`.
    pub fn run<P: AnnealProblem>(
        problem: &P,
        config: &AnnealConfig,
    ) -> Result<AnnealResult<P::Solution>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs with an optional cancellation token.
    pub fn run_with_cancel<P: AnnealProblem>(
        problem: &P,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult<P::Solution>> {
        let mut rng = rng_from(config.seed);
        Self::run_with_rng(problem, config, &mut rng, cancel)
    }

    /// Runs with a caller-supplied random source. `config.seed` is ignored.
    pub fn run_with_rng<P: AnnealProblem, R: Rng>(
        problem: &P,
        config: &AnnealConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult<P::Solution>> {
        config.validate()?;

        let mut current = problem.initial_solution(rng);
        let mut current_cost = problem.cost(&current);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut temperature = config.initial_temperature;
        let mut total_iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cancelled = false;

        let reached = |cost: f64| config.target_cost.is_some_and(|target| cost < target);
        let mut reached_target = reached(best_cost);

        let linear_steps = linear_steps(config);
        let history_interval = 100.max(config.iterations_per_temperature);
        let mut cost_history = vec![best_cost];
        let mut step = 0usize;

        while !reached_target && temperature > config.min_temperature {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            for _ in 0..config.iterations_per_temperature {
                if config.max_iterations > 0 && total_iterations >= config.max_iterations {
                    break;
                }

                let neighbor = problem.neighbor(&current, rng);
                let neighbor_cost = problem.cost(&neighbor);
                let delta = neighbor_cost - current_cost;

                // Metropolis criterion
                let accept = if delta < 0.0 {
                    improving_moves += 1;
                    true
                } else {
                    rng.random_range(0.0..1.0) < (-delta / temperature).exp()
                };

                if accept {
                    current = neighbor;
                    current_cost = neighbor_cost;
                    accepted_moves += 1;

                    if current_cost < best_cost {
                        best = current.clone();
                        best_cost = current_cost;
                    }
                }

                total_iterations += 1;
                if total_iterations % history_interval == 0 {
                    cost_history.push(best_cost);
                }

                if reached(best_cost) {
                    reached_target = true;
                    break;
                }
            }

            if config.max_iterations > 0 && total_iterations >= config.max_iterations {
                break;
            }

            temperature = cool(temperature, config, step, linear_steps);
            step += 1;
        }

        if cost_history
            .last()
            .is_none_or(|&last| (last - best_cost).abs() > 1e-15)
        {
            cost_history.push(best_cost);
        }

        if cancelled {
            log::warn!("annealing cancelled after {total_iterations} iterations");
        }
        log::debug!(
            "annealing finished: {total_iterations} iterations, best cost {best_cost:.4}, \
             {accepted_moves} accepted"
        );

        Ok(AnnealResult {
            best,
            best_cost,
            iterations: total_iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            reached_target,
            cancelled,
            cost_history,
        })
    }
}

fn cool(temperature: f64, config: &AnnealConfig, step: usize, linear_steps: usize) -> f64 {
    match config.cooling {
        CoolingSchedule::Geometric { alpha } => temperature * alpha,
        CoolingSchedule::Linear => {
            let t = config.initial_temperature
                - (step + 1) as f64 * (config.initial_temperature - config.min_temperature)
                    / linear_steps as f64;
            t.max(config.min_temperature)
        }
    }
}

fn linear_steps(config: &AnnealConfig) -> usize {
    if config.max_iterations > 0 {
        (config.max_iterations / config.iterations_per_temperature).max(1)
    } else {
        1000
    }
}
