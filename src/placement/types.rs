//! Placement results.

use crate::geometry::Vec3;
use crate::model::{AuditAction, AuditEntry, PlacementSink, Position};
use crate::rearrangement::MoveStep;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An accepted placement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementRecord {
    pub item_id: String,
    /// Container the item goes into.
    pub container_id: String,
    /// Minimum corner.
    pub start: Vec3,
    /// Maximum corner.
    pub end: Vec3,
    /// Orientation index, `0..6`.
    pub orientation: u8,
    /// Reachable from the open face in the final state of the container.
    pub visible: bool,
    /// Placement score, higher is better.
    pub score: f64,
    /// Room was made by moving other items.
    pub via_rearrangement: bool,
}

impl PlacementRecord {
    /// The record as a stored position.
    pub fn position(&self) -> Position {
        Position::new(&self.item_id, &self.container_id, self.start, self.orientation)
            .with_visible(self.visible)
    }
}

/// Why an item could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnplacedReason {
    /// Non-positive dimensions, negative mass or priority out of range.
    InvalidDimensions,
    /// Larger than every container in every orientation.
    NoFittingContainer,
    /// Fits some container but no free space or weight budget was found,
    /// even after trying to move other items.
    NoSpace,
    /// The run was cancelled before the item was handled.
    Cancelled,
}

/// An item left out of the result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unplaced {
    pub item_id: String,
    /// Why the item was left out.
    pub reason: UnplacedReason,
}

/// Result of a placement run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementOutcome {
    /// In placement order.
    pub placements: Vec<PlacementRecord>,
    /// Relocations of already stowed items, in execution order.
    pub rearrangements: Vec<MoveStep>,
    /// Items left out, in the order they were handled.
    pub unplaced: Vec<Unplaced>,
}

impl PlacementOutcome {
    /// True if every requested item was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn placement_of(&self, item_id: &str) -> Option<&PlacementRecord> {
        self.placements.iter().find(|p| p.item_id == item_id)
    }

    /// Persists the outcome: relocations first, then the new placements,
    /// each with an audit entry.
    pub fn apply<S: PlacementSink + ?Sized>(&self, sink: &mut S) {
        for step in &self.rearrangements {
            let Some(to) = &step.to else {
                continue;
            };
            sink.persist_position(
                Position::new(&step.item_id, &to.container_id, to.bounds.origin, to.orientation)
                    .with_visible(to.visible),
            );
            sink.append_audit(AuditEntry::new(
                AuditAction::Move,
                &step.item_id,
                format!("moved from '{}' to '{}'", step.from_container, to.container_id),
            ));
        }
        for record in &self.placements {
            sink.persist_position(record.position());
            sink.append_audit(AuditEntry::new(
                AuditAction::Placement,
                &record.item_id,
                format!("placed in '{}'", record.container_id),
            ));
        }
    }
}
