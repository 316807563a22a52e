//! Concrete slots that can be cleared for one item.

use super::config::RearrangementConfig;
use super::selection::selection_score;
use crate::geometry::{Aabb, Vec3};
use crate::model::{Container, Item, Orientation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A box currently inside a container, as seen by a planning run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Occupant {
    pub item_id: String,
    /// Current box inside the container.
    pub bounds: Aabb,
    /// Orientation index the box was resolved with.
    pub orientation: u8,
    /// Only occupants ranked below the new item can make room for it.
    pub priority: u8,
    /// Counts against the container weight budget.
    pub mass: f64,
    /// Only occupants that were stowed before the run may be displaced.
    pub movable: bool,
}

/// A slot for the new item and the occupants that must leave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Displacement {
    pub bounds: Aabb,
    pub orientation: u8,
    /// Indices into the occupant slice, front to back.
    pub displaced: Vec<usize>,
    pub freed_volume: f64,
    pub score: f64,
}

/// Candidate slots for `item` in `container`, best first.
///
/// Slots are anchored at the container origin and at the origins of
/// displaceable occupants. A slot is only considered if every occupant it
/// overlaps is movable and strictly less important than `item`, and it
/// overlaps at least one. Orientation 0 is tried first; other orientations
/// are only used if it yields nothing. Slots are ranked with the same
/// score as annealed selections.
pub fn plan_displacement(
    item: &Item,
    container: &Container,
    occupants: &[Occupant],
    config: &RearrangementConfig,
) -> Vec<Displacement> {
    let displaceable = |o: &Occupant| o.movable && o.priority < item.priority;
    if !occupants.iter().any(displaceable) {
        return Vec::new();
    }

    let mut anchors = vec![Vec3::ZERO];
    for o in occupants.iter().filter(|o| displaceable(o)) {
        if !anchors.contains(&o.bounds.origin) {
            anchors.push(o.bounds.origin);
        }
    }

    let mut found = Vec::new();
    for group in [&Orientation::ALL[..1], &Orientation::ALL[1..]] {
        for &orientation in group {
            let dims = item.oriented(orientation);
            if !dims.fits_within(&container.dimensions) {
                continue;
            }
            for &anchor in &anchors {
                let slot = Aabb::new(anchor, dims);
                if !slot.is_within(&container.dimensions) {
                    continue;
                }
                let mut displaced: Vec<usize> = occupants
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| o.bounds.collides(&slot))
                    .map(|(i, _)| i)
                    .collect();
                if displaced.is_empty() || !displaced.iter().all(|&i| displaceable(&occupants[i])) {
                    continue;
                }
                if found
                    .iter()
                    .any(|d: &Displacement| d.bounds == slot && d.displaced == displaced)
                {
                    continue;
                }

                displaced.sort_by(|&a, &b| {
                    occupants[a]
                        .bounds
                        .origin
                        .z
                        .total_cmp(&occupants[b].bounds.origin.z)
                        .then_with(|| occupants[a].item_id.cmp(&occupants[b].item_id))
                });
                let freed_volume: f64 = displaced.iter().map(|&i| occupants[i].bounds.volume()).sum();
                let avg_priority = displaced
                    .iter()
                    .map(|&i| f64::from(occupants[i].priority))
                    .sum::<f64>()
                    / displaced.len() as f64;
                let score = selection_score(
                    slot.volume(),
                    freed_volume,
                    displaced.len(),
                    avg_priority,
                    config.movement_normaliser,
                );
                found.push(Displacement {
                    bounds: slot,
                    orientation: orientation.index(),
                    displaced,
                    freed_volume,
                    score,
                });
            }
        }
        if !found.is_empty() {
            break;
        }
    }

    found.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.displaced.len().cmp(&b.displaced.len()))
    });
    found
}
