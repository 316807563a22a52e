//! Ranking of occupants by how cheaply they can be relocated.

use super::config::RearrangementConfig;
use crate::model::{Container, Item, Placed};

/// An occupant that may be moved out to make room.
#[derive(Debug, Clone, Copy)]
pub struct MovableItem<'a> {
    pub placed: Placed<'a>,
    /// Volume of the occupied box.
    pub volume: f64,
    /// Higher is easier to move.
    pub movability: f64,
}

impl MovableItem<'_> {
    pub fn item_id(&self) -> &str {
        &self.placed.item.id
    }

    pub fn priority(&self) -> u8 {
        self.placed.item.priority
    }
}

/// Weighted movability of one occupant.
///
/// Low priority, visible, small items that are much less important than
/// the incoming items score highest.
pub fn movability_score(item: &Item, visible: bool, new_avg_priority: f64) -> f64 {
    let priority = f64::from(item.priority);
    let priority_factor = 1.0 - priority / 100.0;
    let visibility_factor = if visible { 1.0 } else { 0.5 };
    let volume_factor = 1.0 - (item.volume() / 10_000.0).min(0.9);
    let gap_factor = ((new_avg_priority - priority).max(0.0) / 100.0).min(1.0);

    0.4 * priority_factor + 0.3 * visibility_factor + 0.2 * volume_factor + 0.1 * gap_factor
}

/// Average priority of the incoming items, 0 when there are none.
pub(crate) fn average_priority<'a>(items: impl IntoIterator<Item = &'a Item>) -> f64 {
    let (sum, count) = items
        .into_iter()
        .fold((0.0, 0usize), |(s, n), item| (s + f64::from(item.priority), n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Eligible occupants ranked by movability, highest first, capped at
/// `config.candidate_cap`.
///
/// Occupants more important than the average incoming item are skipped,
/// unless the incoming items need at least `bulk_need_ratio` of the
/// container volume.
pub fn identify_movable_items<'a>(
    container: &Container,
    new_items: &[Item],
    occupants: &[Placed<'a>],
    config: &RearrangementConfig,
) -> Vec<MovableItem<'a>> {
    let needed: f64 = new_items.iter().map(Item::volume).sum();
    let avg_priority = average_priority(new_items);
    let bulk = needed >= container.volume() * config.bulk_need_ratio;

    let mut movable: Vec<MovableItem<'a>> = occupants
        .iter()
        .filter(|p| bulk || f64::from(p.item.priority) <= avg_priority)
        .map(|p| MovableItem {
            placed: *p,
            volume: p.bounds.volume(),
            movability: movability_score(p.item, p.position.visible, avg_priority),
        })
        .collect();

    movable.sort_by(|a, b| {
        b.movability
            .total_cmp(&a.movability)
            .then_with(|| a.item_id().cmp(b.item_id()))
    });
    movable.truncate(config.candidate_cap);
    movable
}
