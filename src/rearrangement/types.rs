//! Rearrangement plans and move steps.

use crate::geometry::Aabb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where a moved item ends up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Destination {
    pub container_id: String,
    pub bounds: Aabb,
    pub orientation: u8,
    pub visible: bool,
}

/// Relocation of one already stowed item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveStep {
    pub item_id: String,
    pub from_container: String,
    /// Box the item occupies before the move.
    pub from: Aabb,
    /// `None` when the destination is left to the caller.
    pub to: Option<Destination>,
}

/// An accepted rearrangement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RearrangementPlan {
    pub container_id: String,
    /// Items to move, front to back.
    pub items_to_move: Vec<String>,
    pub steps: Vec<MoveStep>,
    /// Volume of the items moved out.
    pub freed_volume: f64,
    /// Volume of the incoming items.
    pub needed_volume: f64,
    /// `freed_volume - needed_volume`.
    pub resulting_space: f64,
    pub score: f64,
}

/// Result of a rearrangement request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RearrangementOutcome {
    Planned(RearrangementPlan),
    /// No acceptable plan. This is an expected outcome, not an error.
    NoFeasiblePlan { reason: String },
}

impl RearrangementOutcome {
    pub(crate) fn infeasible(reason: impl Into<String>) -> Self {
        RearrangementOutcome::NoFeasiblePlan {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RearrangementOutcome::Planned(_))
    }

    pub fn plan(&self) -> Option<&RearrangementPlan> {
        match self {
            RearrangementOutcome::Planned(plan) => Some(plan),
            RearrangementOutcome::NoFeasiblePlan { .. } => None,
        }
    }
}

/// A maximal empty box found by [`analyze_container_state`](super::analyze_container_state).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmptySpace {
    pub bounds: Aabb,
    pub volume: f64,
}

/// Occupancy report for one container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerAnalysis {
    pub container_id: String,
    pub total_volume: f64,
    pub used_volume: f64,
    pub available_volume: f64,
    /// `used / total`, 0 for a zero-volume container.
    pub utilization: f64,
    pub item_count: usize,
    /// Largest first, at most ten.
    pub empty_spaces: Vec<EmptySpace>,
    /// `1 - largest_space / free_volume`, 0 when nothing is free.
    pub fragmentation: f64,
}
