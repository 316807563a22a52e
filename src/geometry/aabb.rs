//! Axis-aligned boxes and the scoring primitives built on them.
//!
//! Coordinates are container-local: `x` runs along the width, `y` along the
//! height and `z` along the depth, with `z = 0` at the open face.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for "touching" comparisons between faces.
pub const TOUCH_EPSILON: f64 = 0.01;

/// Tolerance for bound checks.
const BOUNDS_EPSILON: f64 = 1e-9;

/// A triple of `f64`, used for both points and extents.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    /// Width axis.
    pub x: f64,
    /// Height axis.
    pub y: f64,
    /// Depth axis (distance from the open face).
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Product of the three components.
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Returns true if every component is `<=` the matching one in `other`.
    pub fn fits_within(&self, other: &Vec3) -> bool {
        self.x <= other.x + BOUNDS_EPSILON
            && self.y <= other.y + BOUNDS_EPSILON
            && self.z <= other.z + BOUNDS_EPSILON
    }

    /// Returns true if every component is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.z > 0.0
    }
}

/// An axis-aligned bounding box given by its origin and extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub origin: Vec3,
    /// Extent along each axis.
    pub size: Vec3,
}

impl Aabb {
    /// Creates a box from an origin and an extent.
    pub const fn new(origin: Vec3, size: Vec3) -> Self {
        Self { origin, size }
    }

    /// Creates a box from min/max corners.
    pub fn from_corners(min: Vec3, max: Vec3) -> Self {
        Self {
            origin: min,
            size: Vec3::new(max.x - min.x, max.y - min.y, max.z - min.z),
        }
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        self.origin.add(&self.size)
    }

    /// Volume of the box.
    pub fn volume(&self) -> f64 {
        self.size.volume()
    }

    /// Depth coordinate of the box center.
    pub fn center_depth(&self) -> f64 {
        self.origin.z + self.size.z / 2.0
    }

    /// Strict overlap on all three axes. Shared faces do not collide.
    pub fn collides(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other) && self.overlaps_z(other)
    }

    /// Strict overlap of the x-y projections (the footprint seen from the
    /// open face).
    pub fn overlaps_xy(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }

    fn overlaps_x(&self, other: &Aabb) -> bool {
        self.origin.x < other.origin.x + other.size.x && other.origin.x < self.origin.x + self.size.x
    }

    fn overlaps_y(&self, other: &Aabb) -> bool {
        self.origin.y < other.origin.y + other.size.y && other.origin.y < self.origin.y + self.size.y
    }

    fn overlaps_z(&self, other: &Aabb) -> bool {
        self.origin.z < other.origin.z + other.size.z && other.origin.z < self.origin.z + self.size.z
    }

    /// Returns true if `self` sits strictly in front of `other` (closer to
    /// the open face) and covers part of its footprint.
    pub fn blocks(&self, other: &Aabb) -> bool {
        self.origin.z < other.origin.z && self.overlaps_xy(other)
    }

    /// Returns true if the box lies inside `[0, bounds]` on every axis.
    pub fn is_within(&self, bounds: &Vec3) -> bool {
        self.origin.x >= -BOUNDS_EPSILON
            && self.origin.y >= -BOUNDS_EPSILON
            && self.origin.z >= -BOUNDS_EPSILON
            && self.max().fits_within(bounds)
    }

    /// Intersection volume with another box (0 when disjoint).
    pub fn intersection_volume(&self, other: &Aabb) -> f64 {
        let (a_max, b_max) = (self.max(), other.max());
        let dx = a_max.x.min(b_max.x) - self.origin.x.max(other.origin.x);
        let dy = a_max.y.min(b_max.y) - self.origin.y.max(other.origin.y);
        let dz = a_max.z.min(b_max.z) - self.origin.z.max(other.origin.z);
        if dx <= 0.0 || dy <= 0.0 || dz <= 0.0 {
            0.0
        } else {
            dx * dy * dz
        }
    }
}

/// Strict-overlap collision test between two boxes.
pub fn collides(a: &Aabb, b: &Aabb) -> bool {
    a.collides(b)
}

/// Accessibility of a box inside a container of the given depth.
///
/// 1.0 at the open face, falling linearly to 0.0 at the far wall based on the
/// depth of the box center. A zero-depth container yields 1.0.
pub fn accessibility(bounds: &Aabb, container_depth: f64) -> f64 {
    if container_depth == 0.0 {
        return 1.0;
    }
    (1.0 - bounds.center_depth() / container_depth).clamp(0.0, 1.0)
}

/// Number of box faces (out of 6) lying on a container wall.
pub fn touching_surfaces(bounds: &Aabb, container: &Vec3) -> usize {
    let max = bounds.max();
    [
        bounds.origin.x.abs() < TOUCH_EPSILON,
        (max.x - container.x).abs() < TOUCH_EPSILON,
        bounds.origin.y.abs() < TOUCH_EPSILON,
        (max.y - container.y).abs() < TOUCH_EPSILON,
        bounds.origin.z.abs() < TOUCH_EPSILON,
        (max.z - container.z).abs() < TOUCH_EPSILON,
    ]
    .iter()
    .filter(|&&t| t)
    .count()
}
