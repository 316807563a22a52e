//! Storage containers.

use crate::geometry::Vec3;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The face through which a container is loaded and unloaded.
///
/// Geometry is always expressed in the open-face frame: the depth axis
/// points away from the open face, so the open face is the `z = 0` plane
/// whichever physical side it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OpenFace {
    #[default]
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

/// A storage container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Container {
    /// Unique identifier.
    pub id: String,
    /// Zone the container belongs to.
    pub zone: String,
    /// Inner dimensions: width, height, depth.
    pub dimensions: Vec3,
    /// Loading face.
    pub open_face: OpenFace,
    /// Maximum total mass of the contents.
    pub max_weight: Option<f64>,
}

impl Container {
    /// Creates a container with a front open face and no weight limit.
    pub fn new(
        id: impl Into<String>,
        zone: impl Into<String>,
        width: f64,
        height: f64,
        depth: f64,
    ) -> Self {
        Self {
            id: id.into(),
            zone: zone.into(),
            dimensions: Vec3::new(width, height, depth),
            open_face: OpenFace::Front,
            max_weight: None,
        }
    }

    pub fn with_open_face(mut self, face: OpenFace) -> Self {
        self.open_face = face;
        self
    }

    pub fn with_max_weight(mut self, max_weight: f64) -> Self {
        self.max_weight = Some(max_weight);
        self
    }

    /// Inner volume.
    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// Inner depth (distance from the open face to the back wall).
    pub fn depth(&self) -> f64 {
        self.dimensions.z
    }

    /// Checks dimensions and weight limit.
    pub fn validate(&self) -> Result<()> {
        let d = self.dimensions;
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "Dimensions for container '{}' cannot be negative",
                self.id
            )));
        }
        if let Some(max) = self.max_weight {
            if max < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "Weight limit for container '{}' cannot be negative",
                    self.id
                )));
            }
        }
        Ok(())
    }
}
