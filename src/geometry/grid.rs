//! Dense occupancy grids.
//!
//! A grid rasterizes a container into cubic cells stored in one flat
//! `Vec<bool>` with stride indexing (`x` major, `z` minor). Marking and
//! testing both round outward (`floor` on the low side, `ceil` on the high
//! side), so two boxes with positive overlap always share a cell. At coarse
//! resolutions this rejects some placements that would fit exactly, never
//! the other way round.

use super::aabb::{Aabb, Vec3};
use crate::model::{Container, Placed};

/// How the cell size of a grid is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridResolution {
    /// Use 1-unit cells unless the grid would exceed `max_cells`, in which
    /// case the cell size grows until it fits.
    Adaptive {
        /// Upper bound on the number of cells.
        max_cells: usize,
    },
    /// Fixed cell size.
    Fixed(f64),
}

impl Default for GridResolution {
    fn default() -> Self {
        GridResolution::Adaptive {
            max_cells: 2_000_000,
        }
    }
}

impl GridResolution {
    /// Cell size for a container of the given extent.
    pub fn cell_size(&self, extent: &Vec3) -> f64 {
        match *self {
            GridResolution::Fixed(size) => size,
            GridResolution::Adaptive { max_cells } => {
                let max_cells = max_cells.max(1);
                let mut cell = 1.0_f64;
                if cell_count(extent, cell) > max_cells {
                    cell = (extent.volume() / max_cells as f64).cbrt().ceil().max(1.0);
                    while cell_count(extent, cell) > max_cells {
                        cell += 1.0;
                    }
                }
                cell
            }
        }
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        match *self {
            GridResolution::Fixed(size) if !(size > 0.0) => Err(crate::Error::ConfigError(
                format!("fixed grid resolution must be positive, got {size}"),
            )),
            GridResolution::Adaptive { max_cells: 0 } => Err(crate::Error::ConfigError(
                "adaptive grid needs max_cells > 0".into(),
            )),
            _ => Ok(()),
        }
    }
}

fn axis_cells(len: f64, cell: f64) -> usize {
    (len.max(0.0) / cell).floor() as usize + 1
}

fn cell_count(extent: &Vec3, cell: f64) -> usize {
    axis_cells(extent.x, cell)
        .saturating_mul(axis_cells(extent.y, cell))
        .saturating_mul(axis_cells(extent.z, cell))
}

/// Half-open cell range `[lo, hi)` along each axis.
pub type CellSpan = ([usize; 3], [usize; 3]);

/// A 3D boolean occupancy grid over a container.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    extent: Vec3,
    cell: f64,
    dims: [usize; 3],
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates an empty grid. The grid has one extra cell per axis to
    /// absorb rounding at the far walls.
    pub fn new(extent: Vec3, cell: f64) -> Self {
        let dims = [
            axis_cells(extent.x, cell),
            axis_cells(extent.y, cell),
            axis_cells(extent.z, cell),
        ];
        Self {
            extent,
            cell,
            dims,
            cells: vec![false; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Creates a grid with every box in `boxes` marked occupied.
    pub fn from_boxes<'a>(
        extent: Vec3,
        cell: f64,
        boxes: impl IntoIterator<Item = &'a Aabb>,
    ) -> Self {
        let mut grid = Self::new(extent, cell);
        for b in boxes {
            grid.occupy(b);
        }
        grid
    }

    /// Container extent covered by the grid.
    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    /// Edge length of one cell.
    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    /// Number of cells along x, y and z.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.dims[1] + iy) * self.dims[2] + iz
    }

    /// Returns whether a cell is occupied.
    #[inline]
    pub fn is_occupied(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.cells[self.index(ix, iy, iz)]
    }

    fn axis_span(&self, lo: f64, len: f64, axis: usize) -> (usize, usize) {
        let n = self.dims[axis];
        let a = ((lo / self.cell).floor().max(0.0) as usize).min(n);
        let mut b = (((lo + len) / self.cell).ceil().max(0.0) as usize).min(n);
        if len > 0.0 && b <= a && a < n {
            b = a + 1;
        }
        (a, b.max(a))
    }

    /// Cell span swept by a box, clipped to the grid.
    pub fn span(&self, bounds: &Aabb) -> CellSpan {
        let (x0, x1) = self.axis_span(bounds.origin.x, bounds.size.x, 0);
        let (y0, y1) = self.axis_span(bounds.origin.y, bounds.size.y, 1);
        let (z0, z1) = self.axis_span(bounds.origin.z, bounds.size.z, 2);
        ([x0, y0, z0], [x1, y1, z1])
    }

    /// Marks every cell swept by `bounds` as occupied.
    pub fn occupy(&mut self, bounds: &Aabb) {
        let (lo, hi) = self.span(bounds);
        for ix in lo[0]..hi[0] {
            for iy in lo[1]..hi[1] {
                let start = self.index(ix, iy, lo[2]);
                self.cells[start..start + (hi[2] - lo[2])].fill(true);
            }
        }
    }

    /// Returns true if any cell in the half-open span is occupied.
    pub fn any_occupied(&self, lo: [usize; 3], hi: [usize; 3]) -> bool {
        for ix in lo[0]..hi[0] {
            for iy in lo[1]..hi[1] {
                let start = self.index(ix, iy, lo[2]);
                if self.cells[start..start + (hi[2] - lo[2])]
                    .iter()
                    .any(|&c| c)
                {
                    return true;
                }
            }
        }
        false
    }

    /// True iff the box lies inside the container and every cell it
    /// sweeps is free.
    pub fn is_free(&self, bounds: &Aabb) -> bool {
        if !bounds.is_within(&self.extent) {
            return false;
        }
        let (lo, hi) = self.span(bounds);
        !self.any_occupied(lo, hi)
    }

    /// Same as [`is_free`](Self::is_free), taking origin and oriented
    /// dimensions separately.
    pub fn is_valid_position(&self, origin: Vec3, dims: Vec3) -> bool {
        self.is_free(&Aabb::new(origin, dims))
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Builds a summed-volume table for O(1) emptiness queries.
    pub fn summed(&self) -> SummedVolume {
        SummedVolume::new(self)
    }
}

/// Rasterizes the resolved placements of a container into a grid.
///
/// Placements whose item could not be resolved never reach this function
/// (see [`crate::model::resolve_positions`]), so the grid is built from
/// whatever subset of the data is consistent.
pub fn build_occupancy_grid(
    container: &Container,
    placed: &[Placed<'_>],
    resolution: GridResolution,
) -> OccupancyGrid {
    let extent = container.dimensions;
    let cell = resolution.cell_size(&extent);
    OccupancyGrid::from_boxes(extent, cell, placed.iter().map(|p| &p.bounds))
}

/// Three-dimensional prefix sums of occupied cells.
#[derive(Debug, Clone)]
pub struct SummedVolume {
    dims: [usize; 3],
    sums: Vec<u32>,
}

impl SummedVolume {
    fn new(grid: &OccupancyGrid) -> Self {
        let [nx, ny, nz] = grid.dims;
        let (sx, sy, sz) = (nx + 1, ny + 1, nz + 1);
        let mut sums = vec![0u32; sx * sy * sz];
        let at = |x: usize, y: usize, z: usize| (x * sy + y) * sz + z;
        for x in 1..sx {
            for y in 1..sy {
                for z in 1..sz {
                    let own = grid.is_occupied(x - 1, y - 1, z - 1) as u32;
                    // inclusion-exclusion over the seven lower neighbours
                    let v = own + sums[at(x - 1, y, z)] + sums[at(x, y - 1, z)]
                        + sums[at(x, y, z - 1)]
                        + sums[at(x - 1, y - 1, z - 1)]
                        - sums[at(x - 1, y - 1, z)]
                        - sums[at(x - 1, y, z - 1)]
                        - sums[at(x, y - 1, z - 1)];
                    sums[at(x, y, z)] = v;
                }
            }
        }
        Self { dims: grid.dims, sums }
    }

    #[inline]
    fn at(&self, x: usize, y: usize, z: usize) -> u32 {
        self.sums[(x * (self.dims[1] + 1) + y) * (self.dims[2] + 1) + z]
    }

    /// Number of occupied cells in the half-open span `[lo, hi)`.
    pub fn count(&self, lo: [usize; 3], hi: [usize; 3]) -> u32 {
        let [x0, y0, z0] = lo;
        let [x1, y1, z1] = hi;
        if x1 <= x0 || y1 <= y0 || z1 <= z0 {
            return 0;
        }
        let positive = self.at(x1, y1, z1)
            + self.at(x0, y0, z1)
            + self.at(x0, y1, z0)
            + self.at(x1, y0, z0);
        let negative = self.at(x0, y1, z1)
            + self.at(x1, y0, z1)
            + self.at(x1, y1, z0)
            + self.at(x0, y0, z0);
        positive - negative
    }

    /// True if the span contains no occupied cell.
    pub fn is_empty(&self, lo: [usize; 3], hi: [usize; 3]) -> bool {
        self.count(lo, hi) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(o: (f64, f64, f64), s: (f64, f64, f64)) -> Aabb {
        Aabb::new(Vec3::new(o.0, o.1, o.2), Vec3::new(s.0, s.1, s.2))
    }

    #[test]
    fn test_grid_sized_with_margin() {
        let grid = OccupancyGrid::new(Vec3::new(10.0, 20.0, 5.0), 1.0);
        assert_eq!(grid.dims(), [11, 21, 6]);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn test_occupy_and_check() {
        let extent = Vec3::new(20.0, 20.0, 20.0);
        let grid = OccupancyGrid::from_boxes(extent, 1.0, [&boxed((0.0, 0.0, 0.0), (10.0, 10.0, 10.0))]);

        assert_eq!(grid.occupied_cells(), 1000);
        assert!(!grid.is_valid_position(Vec3::new(5.0, 5.0, 5.0), Vec3::new(2.0, 2.0, 2.0)));
        // touching the occupied block is fine
        assert!(grid.is_valid_position(Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0)));
        // out of bounds
        assert!(!grid.is_valid_position(Vec3::new(15.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 1.0)));
    }

    #[test]
    fn test_coarse_grid_is_conservative() {
        let extent = Vec3::new(40.0, 40.0, 40.0);
        let grid = OccupancyGrid::from_boxes(extent, 4.0, [&boxed((0.0, 0.0, 0.0), (5.0, 5.0, 5.0))]);
        // overlaps the occupied box: must be rejected
        assert!(!grid.is_free(&boxed((4.5, 0.0, 0.0), (2.0, 2.0, 2.0))));
        // exact fit next to it shares a coarse cell and is rejected too
        assert!(!grid.is_free(&boxed((5.0, 0.0, 0.0), (2.0, 2.0, 2.0))));
        // aligned away from it is accepted
        assert!(grid.is_free(&boxed((8.0, 0.0, 0.0), (4.0, 4.0, 4.0))));
    }

    #[test]
    fn test_adaptive_resolution() {
        let small = Vec3::new(10.0, 10.0, 10.0);
        assert_eq!(GridResolution::Adaptive { max_cells: 10_000 }.cell_size(&small), 1.0);

        let large = Vec3::new(1000.0, 1000.0, 1000.0);
        let cell = GridResolution::Adaptive { max_cells: 1_000_000 }.cell_size(&large);
        assert!(cell > 1.0);
        let grid = OccupancyGrid::new(large, cell);
        let [x, y, z] = grid.dims();
        assert!(x * y * z <= 1_000_000);
    }

    #[test]
    fn test_summed_volume_matches_scan() {
        let extent = Vec3::new(10.0, 10.0, 10.0);
        let grid = OccupancyGrid::from_boxes(
            extent,
            1.0,
            [
                &boxed((0.0, 0.0, 0.0), (3.0, 3.0, 3.0)),
                &boxed((5.0, 5.0, 5.0), (2.0, 4.0, 1.0)),
            ],
        );
        let summed = grid.summed();
        assert_eq!(summed.count([0, 0, 0], [11, 11, 11]) as usize, grid.occupied_cells());
        assert_eq!(summed.count([0, 0, 0], [3, 3, 3]), 27);
        assert!(summed.is_empty([3, 0, 0], [5, 10, 10]));
        assert!(!summed.is_empty([6, 8, 5], [7, 9, 6]));
    }

    #[test]
    fn test_inverted_box_marks_nothing() {
        let mut grid = OccupancyGrid::new(Vec3::new(20.0, 20.0, 20.0), 1.0);
        let inverted = boxed((0.0, 0.0, 10.0), (5.0, 5.0, -3.0));
        let (lo, hi) = grid.span(&inverted);
        assert!(hi[2] >= lo[2]);
        grid.occupy(&inverted);
        assert_eq!(grid.occupied_cells(), 0);
        assert!(!grid.any_occupied(lo, hi));
    }
}
