//! Geometry kernel.
//!
//! Axis-aligned collision tests, occupancy grids, accessibility scoring and
//! empty-space candidate generation. Everything here is a pure function of
//! its inputs.

mod aabb;
mod grid;
mod space;

pub use aabb::{accessibility, collides, touching_surfaces, Aabb, Vec3, TOUCH_EPSILON};
pub use grid::{
    build_occupancy_grid, CellSpan, GridResolution, OccupancyGrid, SummedVolume,
};
pub use space::{find_empty_space, find_empty_space_in, DEFAULT_SPACE_LIMIT};
