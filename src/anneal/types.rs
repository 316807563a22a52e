//! Core trait for annealed search.

use rand::Rng;

/// Defines a problem for the [`Annealer`](super::Annealer).
///
/// The runner minimizes [`cost`](Self::cost). For maximization, negate
/// the score.
pub trait AnnealProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send;

    /// Creates the starting solution.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Self::Solution;

    /// Computes the cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> f64;

    /// Generates a neighbor of the current solution.
    ///
    /// Returning a clone of `solution` is allowed when the drawn move is
    /// infeasible; the runner counts it as a zero-delta move.
    fn neighbor<R: Rng>(&self, solution: &Self::Solution, rng: &mut R) -> Self::Solution;
}
