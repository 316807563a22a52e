//! Rearrangement planning.
//!
//! When a container has no room left for incoming items, some occupants
//! can be moved out instead. Occupants are ranked by movability, a subset
//! that frees enough volume is chosen by simulated annealing, and the
//! chosen items are listed front to back so the open face is cleared
//! first.
//!
//! [`plan_displacement`] answers the narrower question the placement
//! engine asks: which concrete slot can be cleared for one item.

mod analysis;
mod config;
mod displacement;
mod movability;
mod planner;
mod selection;
mod types;

pub use analysis::{analysis_cell_size, analyze_container_state, find_maximal_spaces, MAX_EMPTY_SPACES};
pub use config::RearrangementConfig;
pub use displacement::{plan_displacement, Displacement, Occupant};
pub use movability::{identify_movable_items, movability_score, MovableItem};
pub use planner::{plan_rearrangement, plan_rearrangement_with_cancel};
pub use selection::{selection_score, SelectionState};
pub use types::{
    ContainerAnalysis, Destination, EmptySpace, MoveStep, RearrangementOutcome, RearrangementPlan,
};
