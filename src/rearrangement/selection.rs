//! Annealed choice of which movable items to relocate.

use rand::Rng;

use super::config::RearrangementConfig;
use super::movability::MovableItem;
use crate::anneal::AnnealProblem;

/// A candidate subset of movable items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionState {
    /// Indices into the candidate list.
    pub selected: Vec<usize>,
    /// Total volume of the selected items.
    pub freed_volume: f64,
}

/// Quality of moving `count` items with the given average priority to
/// free `freed` volume when `needed` is required. Higher is better.
///
/// `0.4 * space_efficiency + 0.3 * movement_factor + 0.3 * priority_score`
pub fn selection_score(
    needed: f64,
    freed: f64,
    count: usize,
    avg_priority: f64,
    movement_normaliser: f64,
) -> f64 {
    let space_efficiency = (needed / freed.max(1.0)).min(1.0);
    let movement_factor = 1.0 - (count as f64 / movement_normaliser).min(0.9);
    let priority_score = 1.0 - avg_priority / 100.0;
    0.4 * space_efficiency + 0.3 * movement_factor + 0.3 * priority_score
}

/// The subset-selection problem handed to the annealer.
pub(crate) struct SelectionProblem<'c, 'a> {
    candidates: &'c [MovableItem<'a>],
    needed: f64,
    movement_normaliser: f64,
    initial: SelectionState,
}

impl<'c, 'a> SelectionProblem<'c, 'a> {
    /// Returns `None` if all candidates together free less than `needed`.
    ///
    /// `candidates` must already be ranked by movability.
    pub(crate) fn new(
        candidates: &'c [MovableItem<'a>],
        needed: f64,
        config: &RearrangementConfig,
    ) -> Option<Self> {
        let initial = greedy_selection(candidates, needed, config.volume_buffer)?;
        Some(Self {
            candidates,
            needed,
            movement_normaliser: config.movement_normaliser,
            initial,
        })
    }

    pub(crate) fn score(&self, state: &SelectionState) -> f64 {
        if state.freed_volume < self.needed {
            return 0.0;
        }
        let avg_priority = if state.selected.is_empty() {
            0.0
        } else {
            state
                .selected
                .iter()
                .map(|&i| f64::from(self.candidates[i].priority()))
                .sum::<f64>()
                / state.selected.len() as f64
        };
        selection_score(
            self.needed,
            state.freed_volume,
            state.selected.len(),
            avg_priority,
            self.movement_normaliser,
        )
    }

    fn unselected(&self, state: &SelectionState) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|i| !state.selected.contains(i))
            .collect()
    }
}

/// Takes candidates in rank order until `buffer * needed` is freed, or
/// until at least `needed` is freed if the buffer cannot be reached.
fn greedy_selection(candidates: &[MovableItem<'_>], needed: f64, buffer: f64) -> Option<SelectionState> {
    let mut state = SelectionState::default();
    for (i, candidate) in candidates.iter().enumerate() {
        state.selected.push(i);
        state.freed_volume += candidate.volume;
        if state.freed_volume >= needed * buffer {
            break;
        }
    }
    (state.freed_volume >= needed).then_some(state)
}

impl AnnealProblem for SelectionProblem<'_, '_> {
    type Solution = SelectionState;

    fn initial_solution<R: Rng>(&self, _rng: &mut R) -> SelectionState {
        self.initial.clone()
    }

    fn cost(&self, state: &SelectionState) -> f64 {
        -self.score(state)
    }

    /// Adds, removes or swaps one item with equal probability. Removals
    /// and swaps that would free less than the needed volume leave the
    /// state unchanged.
    fn neighbor<R: Rng>(&self, state: &SelectionState, rng: &mut R) -> SelectionState {
        let mut next = state.clone();
        match rng.random_range(0..3) {
            0 => {
                let pool = self.unselected(state);
                if !pool.is_empty() {
                    let add = pool[rng.random_range(0..pool.len())];
                    next.selected.push(add);
                    next.freed_volume += self.candidates[add].volume;
                }
            }
            1 => {
                if state.selected.len() > 1 {
                    let slot = rng.random_range(0..state.selected.len());
                    let removed = next.selected.swap_remove(slot);
                    next.freed_volume -= self.candidates[removed].volume;
                }
            }
            _ => {
                let pool = self.unselected(state);
                if !pool.is_empty() && !state.selected.is_empty() {
                    let slot = rng.random_range(0..state.selected.len());
                    let add = pool[rng.random_range(0..pool.len())];
                    let removed = std::mem::replace(&mut next.selected[slot], add);
                    next.freed_volume +=
                        self.candidates[add].volume - self.candidates[removed].volume;
                }
            }
        }
        if next.freed_volume < self.needed {
            return state.clone();
        }
        next
    }
}
