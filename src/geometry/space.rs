//! Candidate generation for empty space.

use super::aabb::{Aabb, Vec3};
use super::grid::{build_occupancy_grid, GridResolution, OccupancyGrid};
use crate::model::{Container, Placed};

/// Default cap on the number of origins returned by [`find_empty_space`].
pub const DEFAULT_SPACE_LIMIT: usize = 64;

/// Grid-aligned origins in `container` where a box of at least `min` fits
/// without touching any of `placed`.
///
/// The grid uses the adaptive default resolution and at most
/// [`DEFAULT_SPACE_LIMIT`] origins are returned, front rows first.
pub fn find_empty_space(container: &Container, placed: &[Placed<'_>], min: Vec3) -> Vec<Vec3> {
    let grid = build_occupancy_grid(container, placed, GridResolution::default());
    find_empty_space_in(&grid, min, DEFAULT_SPACE_LIMIT)
}

/// Enumerates grid-aligned origins of `grid` where a box of at least `min`
/// fits.
///
/// Origins are visited front to back (`z` outermost), then bottom to top,
/// then left to right, and the scan stops after `limit` hits. The result is
/// a front-biased sample, not an exhaustive list.
pub fn find_empty_space_in(grid: &OccupancyGrid, min: Vec3, limit: usize) -> Vec<Vec3> {
    let mut found = Vec::new();
    if limit == 0 || !min.is_positive() || !min.fits_within(&grid.extent()) {
        return found;
    }

    let cell = grid.cell_size();
    let extent = grid.extent();
    let summed = grid.summed();
    let steps = |len: f64, need: f64| ((len - need) / cell).floor().max(0.0) as usize + 1;
    let (nx, ny, nz) = (
        steps(extent.x, min.x),
        steps(extent.y, min.y),
        steps(extent.z, min.z),
    );

    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                let origin = Vec3::new(ix as f64 * cell, iy as f64 * cell, iz as f64 * cell);
                let bounds = Aabb::new(origin, min);
                if !bounds.is_within(&extent) {
                    continue;
                }
                let (lo, hi) = grid.span(&bounds);
                if summed.is_empty(lo, hi) {
                    found.push(origin);
                    if found.len() >= limit {
                        return found;
                    }
                }
            }
        }
    }
    found
}
