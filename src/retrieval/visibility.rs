//! Open-face visibility.

use crate::geometry::Aabb;
use crate::model::{Catalog, Position};

/// True if `target` can leave through the open face without moving
/// anything: it touches the face, or no other box sits strictly in front
/// of it with an overlapping footprint.
///
/// The `z == 0` test is exact. Front-row items are expected to be placed
/// at exactly zero depth.
pub fn is_visible<'a>(target: &Aabb, others: impl IntoIterator<Item = &'a Aabb>) -> bool {
    #[allow(clippy::float_cmp)]
    let at_face = target.origin.z == 0.0;
    at_face || !others.into_iter().any(|other| other.blocks(target))
}

/// Visibility of every box in `boxes` against all the others.
pub fn visibility_flags(boxes: &[Aabb]) -> Vec<bool> {
    boxes
        .iter()
        .enumerate()
        .map(|(i, target)| {
            is_visible(
                target,
                boxes.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, b)| b),
            )
        })
        .collect()
}

/// Recomputes the `visible` flag of each position from the current
/// geometry. Positions whose item does not resolve are left untouched.
///
/// Returns the number of flags that changed.
pub fn refresh_visibility<C: Catalog + ?Sized>(positions: &mut [Position], catalog: &C) -> usize {
    let bounds: Vec<Option<Aabb>> = positions
        .iter()
        .map(|p| catalog.item(&p.item_id).and_then(|item| p.bounds(item)))
        .collect();

    let mut changed = 0;
    for (i, position) in positions.iter_mut().enumerate() {
        let Some(target) = &bounds[i] else {
            continue;
        };
        let others = bounds
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(_, b)| b.as_ref());
        let visible = is_visible(target, others);
        if visible != position.visible {
            position.visible = visible;
            changed += 1;
        }
    }
    changed
}
