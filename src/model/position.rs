//! Positions and their resolved bounding boxes.

use super::catalog::Catalog;
use super::item::{Item, Orientation};
use crate::geometry::{Aabb, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The current location of one item inside one container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub item_id: String,
    pub container_id: String,
    /// Minimum corner in container-local coordinates.
    pub origin: Vec3,
    /// Raw orientation index. Values outside `0..6` are treated as corrupt
    /// and the position is ignored by geometry routines.
    pub orientation: u8,
    /// Reachable from the open face without moving anything.
    pub visible: bool,
}

impl Position {
    pub fn new(
        item_id: impl Into<String>,
        container_id: impl Into<String>,
        origin: Vec3,
        orientation: u8,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            container_id: container_id.into(),
            origin,
            orientation,
            visible: false,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Bounding box of `item` at this position, or `None` if the
    /// orientation index is invalid.
    pub fn bounds(&self, item: &Item) -> Option<Aabb> {
        let orientation = Orientation::new(self.orientation)?;
        Some(Aabb::new(self.origin, item.oriented(orientation)))
    }
}

/// A position joined with its item and oriented bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Placed<'a> {
    pub item: &'a Item,
    pub position: &'a Position,
    pub bounds: Aabb,
}

/// Resolves positions against a catalog.
///
/// Positions whose item does not resolve, or whose orientation index is
/// out of range, are skipped with a warning so that the rest of the
/// container can still be planned.
pub fn resolve_positions<'a, C>(
    positions: impl IntoIterator<Item = &'a Position>,
    catalog: &'a C,
) -> Vec<Placed<'a>>
where
    C: Catalog + ?Sized,
{
    let mut placed = Vec::new();
    for position in positions {
        let Some(item) = catalog.item(&position.item_id) else {
            log::warn!(
                "skipping position of unknown item '{}' in container '{}'",
                position.item_id,
                position.container_id
            );
            continue;
        };
        let Some(bounds) = position.bounds(item) else {
            log::warn!(
                "skipping item '{}': invalid orientation index {}",
                position.item_id,
                position.orientation
            );
            continue;
        };
        if !bounds.size.is_positive() {
            log::warn!(
                "skipping item '{}' in container '{}': non-positive dimensions",
                position.item_id,
                position.container_id
            );
            continue;
        }
        placed.push(Placed {
            item,
            position,
            bounds,
        });
    }
    placed
}
