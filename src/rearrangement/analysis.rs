//! Deterministic free-space analysis.
//!
//! Maximal empty boxes are grown from corner cells: free cells on a
//! container wall or next to an occupied cell. Each box grows along x,
//! then y, then z for as long as the added slab stays empty. Emptiness is
//! answered by a summed-volume table, so every growth step is O(1).

use std::collections::HashSet;

use super::types::{ContainerAnalysis, EmptySpace};
use crate::geometry::{Aabb, CellSpan, OccupancyGrid, SummedVolume, Vec3};
use crate::model::{Container, Placed};

/// Maximum number of spaces reported.
pub const MAX_EMPTY_SPACES: usize = 10;

/// Spaces covered beyond this fraction by larger spaces are dropped.
const COVERED_SKIP_RATIO: f64 = 0.7;

/// Cell size used for the analysis: one twentieth of the smallest
/// container side, at least 1.
pub fn analysis_cell_size(extent: &Vec3) -> f64 {
    let per_axis = |len: f64| (len / 20.0).floor();
    per_axis(extent.x)
        .min(per_axis(extent.y))
        .min(per_axis(extent.z))
        .max(1.0)
}

/// Occupancy report for a container and its resolved occupants.
pub fn analyze_container_state(container: &Container, occupants: &[Placed<'_>]) -> ContainerAnalysis {
    let total_volume = container.volume();
    let used_volume: f64 = occupants.iter().map(|p| p.bounds.volume()).sum();
    let available_volume = total_volume - used_volume;
    let utilization = if total_volume > 0.0 {
        used_volume / total_volume
    } else {
        0.0
    };

    let empty_spaces = find_maximal_spaces(container.dimensions, occupants.iter().map(|p| &p.bounds));
    let largest = empty_spaces.first().map_or(0.0, |s| s.volume);
    let fragmentation = if available_volume <= 0.0 {
        0.0
    } else {
        (1.0 - largest / available_volume).clamp(0.0, 1.0)
    };

    log::debug!(
        "container '{}': {:.1}% used, {} empty spaces, fragmentation {:.2}",
        container.id,
        utilization * 100.0,
        empty_spaces.len(),
        fragmentation
    );

    ContainerAnalysis {
        container_id: container.id.clone(),
        total_volume,
        used_volume,
        available_volume,
        utilization,
        item_count: occupants.len(),
        empty_spaces,
        fragmentation,
    }
}

/// Largest empty boxes inside `extent`, largest first.
pub fn find_maximal_spaces<'a>(
    extent: Vec3,
    boxes: impl IntoIterator<Item = &'a Aabb>,
) -> Vec<EmptySpace> {
    let cell = analysis_cell_size(&extent);
    let grid = OccupancyGrid::from_boxes(extent, cell, boxes);
    let summed = grid.summed();
    // only cells that end inside the container
    let limit = [
        (extent.x / cell).floor() as usize,
        (extent.y / cell).floor() as usize,
        (extent.z / cell).floor() as usize,
    ];
    if limit.contains(&0) {
        return Vec::new();
    }

    let dims = grid.dims();
    let occupied = |x: usize, y: usize, z: usize| grid.is_occupied(x, y, z);
    let mut seen: HashSet<CellSpan> = HashSet::new();
    let mut candidates: Vec<(CellSpan, usize)> = Vec::new();

    for x in 0..limit[0] {
        for y in 0..limit[1] {
            for z in 0..limit[2] {
                if occupied(x, y, z) {
                    continue;
                }
                let on_wall = x == 0
                    || y == 0
                    || z == 0
                    || x + 1 == limit[0]
                    || y + 1 == limit[1]
                    || z + 1 == limit[2];
                let near_occupied = (x > 0 && occupied(x - 1, y, z))
                    || (y > 0 && occupied(x, y - 1, z))
                    || (z > 0 && occupied(x, y, z - 1))
                    || (x + 1 < dims[0] && occupied(x + 1, y, z))
                    || (y + 1 < dims[1] && occupied(x, y + 1, z))
                    || (z + 1 < dims[2] && occupied(x, y, z + 1));
                if !on_wall && !near_occupied {
                    continue;
                }

                let lo = [x, y, z];
                let hi = grow(&summed, lo, limit);
                let cells = (hi[0] - lo[0]) * (hi[1] - lo[1]) * (hi[2] - lo[2]);
                if cells > 1 && seen.insert((lo, hi)) {
                    candidates.push(((lo, hi), cells));
                }
            }
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let to_box = |(lo, hi): CellSpan| {
        Aabb::new(
            Vec3::new(lo[0] as f64 * cell, lo[1] as f64 * cell, lo[2] as f64 * cell),
            Vec3::new(
                (hi[0] - lo[0]) as f64 * cell,
                (hi[1] - lo[1]) as f64 * cell,
                (hi[2] - lo[2]) as f64 * cell,
            ),
        )
    };

    let mut coverage = OccupancyGrid::new(extent, cell);
    let mut covered = coverage.summed();
    let mut spaces = Vec::new();
    for ((lo, hi), cells) in candidates {
        let overlap = covered.count(lo, hi) as f64 / cells as f64;
        if overlap > COVERED_SKIP_RATIO {
            continue;
        }
        let bounds = to_box((lo, hi));
        spaces.push(EmptySpace {
            bounds,
            volume: bounds.volume(),
        });
        if spaces.len() >= MAX_EMPTY_SPACES {
            break;
        }
        coverage.occupy(&bounds);
        covered = coverage.summed();
    }
    spaces
}

fn grow(summed: &SummedVolume, lo: [usize; 3], limit: [usize; 3]) -> [usize; 3] {
    let mut hi = [lo[0] + 1, lo[1] + 1, lo[2] + 1];
    for axis in 0..3 {
        while hi[axis] < limit[axis] {
            let mut slab_lo = lo;
            slab_lo[axis] = hi[axis];
            let mut slab_hi = hi;
            slab_hi[axis] = hi[axis] + 1;
            if !summed.is_empty(slab_lo, slab_hi) {
                break;
            }
            hi[axis] += 1;
        }
    }
    hi
}
