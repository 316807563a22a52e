//! Position search inside one container.
//!
//! Orientations are visited by decreasing score bound and skipped once the
//! bound cannot beat the best placement so far. For each orientation the
//! strategic candidates are tried first: the eight corners, a floor sweep
//! (`y = 0`), a front-face sweep (`z = 0`) and the extreme points generated
//! by the occupants. Only if none of them is free are the grid-aligned
//! empty-space origins tried, and after them a coarse uniform sweep, front
//! rows first.

use std::sync::atomic::{AtomicBool, Ordering};

use super::cache::ContainerState;
use super::config::PlacementConfig;
use super::score::PlacementScorer;
use crate::geometry::{find_empty_space_in, Aabb, Vec3, DEFAULT_SPACE_LIMIT};
use crate::model::{Container, Item, Orientation};

/// Best placement found for one item in one container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub bounds: Aabb,
    pub orientation: u8,
    pub score: f64,
}

struct Search<'a> {
    state: &'a ContainerState,
    scorer: PlacementScorer<'a>,
    best: Option<Candidate>,
    evaluated: usize,
}

impl Search<'_> {
    fn best_score(&self) -> f64 {
        self.best.map_or(f64::NEG_INFINITY, |c| c.score)
    }

    fn try_origin(&mut self, origin: Vec3, dims: Vec3, orientation: u8) {
        let bounds = Aabb::new(origin, dims);
        self.evaluated += 1;
        if !self.state.grid.is_free(&bounds) {
            return;
        }
        let score = self.scorer.score(&bounds);
        if score > self.best_score() {
            self.best = Some(Candidate {
                bounds,
                orientation,
                score,
            });
        }
    }
}

/// Offsets `0, step, 2 * step, ...` up to `room`, always ending at `room`.
fn axis_steps(room: f64, step: f64) -> Vec<f64> {
    let mut steps = Vec::new();
    let mut v = 0.0;
    while v < room {
        steps.push(v);
        v += step;
    }
    steps.push(room.max(0.0));
    steps
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

/// Highest-scoring free placement of `item` in `container`, if any.
///
/// Returns `None` as soon as `cancel` is observed set.
pub fn best_position(
    item: &Item,
    container: &Container,
    state: &ContainerState,
    config: &PlacementConfig,
    cancel: Option<&AtomicBool>,
) -> Option<Candidate> {
    let extent = container.dimensions;
    let scorer = PlacementScorer::new(item, container, config.weights);

    let mut orientations: Vec<(u8, Vec3, f64)> = Vec::with_capacity(6);
    for orientation in Orientation::ALL {
        let dims = item.oriented(orientation);
        if !dims.fits_within(&extent) || orientations.iter().any(|(_, d, _)| *d == dims) {
            continue;
        }
        orientations.push((orientation.index(), dims, scorer.bound(dims, None)));
    }
    orientations.sort_by(|a, b| b.2.total_cmp(&a.2));

    let cell = state.grid.cell_size();
    let step_for = |dims: Vec3| {
        config.sweep_step.unwrap_or_else(|| {
            let smallest = dims.x.min(dims.y).min(dims.z);
            (smallest / 2.0).floor().max(cell)
        })
    };

    let mut search = Search {
        state,
        scorer,
        best: None,
        evaluated: 0,
    };

    for &(orientation, dims, bound) in &orientations {
        if is_cancelled(cancel) {
            return None;
        }
        if bound <= search.best_score() {
            continue;
        }
        let room = Vec3::new(extent.x - dims.x, extent.y - dims.y, extent.z - dims.z);
        let step = step_for(dims);
        let (xs, ys, zs) = (
            axis_steps(room.x, step),
            axis_steps(room.y, step),
            axis_steps(room.z, step),
        );

        for &x in &[0.0, room.x] {
            for &y in &[0.0, room.y] {
                for &z in &[0.0, room.z] {
                    search.try_origin(Vec3::new(x, y, z), dims, orientation);
                }
            }
        }
        for &z in &zs {
            for &x in &xs {
                search.try_origin(Vec3::new(x, 0.0, z), dims, orientation);
            }
        }
        for &y in &ys {
            for &x in &xs {
                search.try_origin(Vec3::new(x, y, 0.0), dims, orientation);
            }
        }
        for occupant in &state.occupants {
            let (o, m) = (occupant.bounds.origin, occupant.bounds.max());
            for origin in [
                Vec3::new(m.x, o.y, o.z),
                Vec3::new(o.x, m.y, o.z),
                Vec3::new(o.x, o.y, m.z),
            ] {
                if origin.x <= room.x && origin.y <= room.y && origin.z <= room.z {
                    search.try_origin(origin, dims, orientation);
                }
            }
        }

        if search.best_score() >= bound - config.near_optimal_tolerance {
            break;
        }
    }

    if search.best.is_none() {
        for &(orientation, dims, _) in &orientations {
            if is_cancelled(cancel) {
                return None;
            }
            for origin in find_empty_space_in(&state.grid, dims, DEFAULT_SPACE_LIMIT) {
                search.try_origin(origin, dims, orientation);
            }
        }
    }

    if search.best.is_none() {
        'orientations: for &(orientation, dims, _) in &orientations {
            let room = Vec3::new(extent.x - dims.x, extent.y - dims.y, extent.z - dims.z);
            let step = step_for(dims);
            let (xs, ys) = (axis_steps(room.x, step), axis_steps(room.y, step));
            for z in axis_steps(room.z, step) {
                if is_cancelled(cancel) {
                    return None;
                }
                let row_bound = search.scorer.bound(dims, Some(z));
                if row_bound <= search.best_score() {
                    continue;
                }
                for &y in &ys {
                    for &x in &xs {
                        search.try_origin(Vec3::new(x, y, z), dims, orientation);
                    }
                }
                if search.best_score() >= row_bound - config.near_optimal_tolerance {
                    break 'orientations;
                }
            }
        }
    }

    log::trace!(
        "item '{}' in '{}': {} origins evaluated",
        item.id,
        container.id,
        search.evaluated
    );
    search.best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridResolution;
    use crate::model::{Catalog, Position, Snapshot};
    use crate::rearrangement::Occupant;
    use std::collections::HashSet;

    fn state_with(container: &Container, boxes: &[Aabb]) -> ContainerState {
        let mut state = ContainerState::from_catalog(
            container,
            &Snapshot::new(),
            &HashSet::new(),
            GridResolution::default(),
        );
        for (i, b) in boxes.iter().enumerate() {
            state.add(Occupant {
                item_id: format!("o{i}"),
                bounds: *b,
                orientation: 0,
                priority: 10,
                mass: 0.0,
                movable: true,
            });
        }
        state
    }

    fn exhaustive_best(
        item: &Item,
        container: &Container,
        state: &ContainerState,
        step: f64,
    ) -> Option<Candidate> {
        let scorer = PlacementScorer::new(item, container, Default::default());
        let extent = container.dimensions;
        let mut search = Search {
            state,
            scorer,
            best: None,
            evaluated: 0,
        };
        for orientation in Orientation::ALL {
            let dims = item.oriented(orientation);
            if !dims.fits_within(&extent) {
                continue;
            }
            for z in axis_steps(extent.z - dims.z, step) {
                for y in axis_steps(extent.y - dims.y, step) {
                    for x in axis_steps(extent.x - dims.x, step) {
                        search.try_origin(Vec3::new(x, y, z), dims, orientation.index());
                    }
                }
            }
        }
        search.best
    }

    #[test]
    fn test_axis_steps() {
        assert_eq!(axis_steps(10.0, 4.0), vec![0.0, 4.0, 8.0, 10.0]);
        assert_eq!(axis_steps(0.0, 4.0), vec![0.0]);
        assert_eq!(axis_steps(8.0, 4.0), vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn test_empty_container_prefers_front_corner() {
        let container = Container::new("C", "Z", 50.0, 50.0, 50.0);
        let state = state_with(&container, &[]);
        let item = Item::new("i", 10.0, 20.0, 30.0);
        let best = best_position(&item, &container, &state, &PlacementConfig::default(), None).unwrap();
        assert_eq!(best.bounds.origin, Vec3::ZERO);
        // shallowest orientation puts the 10 side along z
        assert_eq!(best.bounds.size.z, 10.0);
        assert!(best.bounds.is_within(&container.dimensions));
    }

    #[test]
    fn test_avoids_occupied_space() {
        let container = Container::new("C", "Z", 20.0, 20.0, 20.0);
        let blocker = Aabb::new(Vec3::ZERO, Vec3::new(20.0, 20.0, 10.0));
        let state = state_with(&container, &[blocker]);
        let item = Item::new("i", 20.0, 20.0, 10.0);
        let best = best_position(&item, &container, &state, &PlacementConfig::default(), None).unwrap();
        assert_eq!(best.bounds.origin, Vec3::new(0.0, 0.0, 10.0));
        assert!(!best.bounds.collides(&blocker));
    }

    #[test]
    fn test_full_container_has_no_position() {
        let container = Container::new("C", "Z", 20.0, 20.0, 20.0);
        let state = state_with(&container, &[Aabb::new(Vec3::ZERO, Vec3::new(20.0, 20.0, 20.0))]);
        let item = Item::new("i", 1.0, 1.0, 1.0);
        assert!(best_position(&item, &container, &state, &PlacementConfig::default(), None).is_none());
    }

    #[test]
    fn test_enclosed_pocket_found_from_empty_space_origins() {
        // six slabs leave only the pocket [4, 9]^3 free; no corner, face
        // sweep or extreme point lands inside it
        let container = Container::new("C", "Z", 12.0, 12.0, 12.0);
        let slabs = [
            Aabb::new(Vec3::ZERO, Vec3::new(4.0, 12.0, 12.0)),
            Aabb::new(Vec3::new(9.0, 0.0, 0.0), Vec3::new(3.0, 12.0, 12.0)),
            Aabb::new(Vec3::ZERO, Vec3::new(12.0, 4.0, 12.0)),
            Aabb::new(Vec3::new(0.0, 9.0, 0.0), Vec3::new(12.0, 3.0, 12.0)),
            Aabb::new(Vec3::ZERO, Vec3::new(12.0, 12.0, 4.0)),
            Aabb::new(Vec3::new(0.0, 0.0, 9.0), Vec3::new(12.0, 12.0, 3.0)),
        ];
        let state = state_with(&container, &slabs);
        let item = Item::new("i", 4.0, 4.0, 4.0);
        // a step of 3 never lands on 4 or 5, so the coarse sweep alone misses
        let config = PlacementConfig::default().with_sweep_step(3.0);

        let spots = find_empty_space_in(&state.grid, Vec3::new(4.0, 4.0, 4.0), DEFAULT_SPACE_LIMIT);
        assert_eq!(spots.first(), Some(&Vec3::new(4.0, 4.0, 4.0)));

        let best = best_position(&item, &container, &state, &config, None).unwrap();
        assert_eq!(best.bounds.origin, Vec3::new(4.0, 4.0, 4.0));
        assert!(slabs.iter().all(|s| !best.bounds.collides(s)));
    }

    #[test]
    fn test_matches_exhaustive_search_on_open_floor() {
        let container = Container::new("C", "Z", 30.0, 24.0, 36.0);
        let boxes = [
            Aabb::new(Vec3::ZERO, Vec3::new(12.0, 24.0, 12.0)),
            Aabb::new(Vec3::new(12.0, 0.0, 0.0), Vec3::new(18.0, 6.0, 18.0)),
        ];
        let state = state_with(&container, &boxes);
        let item = Item::new("i", 6.0, 12.0, 6.0).with_priority(50);
        let config = PlacementConfig::default().with_sweep_step(6.0);
        let best = best_position(&item, &container, &state, &config, None).unwrap();
        let reference = exhaustive_best(&item, &container, &state, 6.0).unwrap();
        assert!(best.score >= reference.score - config.near_optimal_tolerance);
        for b in &boxes {
            assert!(!best.bounds.collides(b));
        }
    }

    #[test]
    fn test_cancelled_search_returns_nothing() {
        let container = Container::new("C", "Z", 20.0, 20.0, 20.0);
        let state = state_with(&container, &[]);
        let flag = AtomicBool::new(true);
        let item = Item::new("i", 5.0, 5.0, 5.0);
        assert!(best_position(&item, &container, &state, &PlacementConfig::default(), Some(&flag)).is_none());
    }

    #[test]
    fn test_catalog_backed_state() {
        let mut snap = Snapshot::new();
        snap.add_container(Container::new("C", "Z", 10.0, 10.0, 10.0));
        snap.add_item(Item::new("a", 10.0, 10.0, 5.0));
        snap.add_position(Position::new("a", "C", Vec3::ZERO, 0));
        let container = snap.container("C").unwrap().clone();
        let state = ContainerState::from_catalog(&container, &snap, &HashSet::new(), GridResolution::default());
        let item = Item::new("b", 10.0, 10.0, 5.0);
        let best = best_position(&item, &container, &state, &PlacementConfig::default(), None).unwrap();
        assert_eq!(best.bounds.origin.z, 5.0);
    }
}
