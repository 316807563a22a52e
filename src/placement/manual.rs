//! Checks for user-chosen placements.

use crate::geometry::{Aabb, Vec3};
use crate::model::{Container, Item, Orientation, Placed};
use crate::{Error, Result};

/// Validates placing `item` at `origin` with `orientation` among the
/// resolved `occupants` of `container`, returning the resulting box.
///
/// An occupant with the same item id is ignored, so an item can be
/// re-validated at a new spot in the container it already sits in.
///
/// # Errors
///
/// [`Error::InvalidGeometry`] for an invalid item, container or
/// orientation, a negative origin, a box that leaves the container or one
/// that overlaps another item.
pub fn validate_manual_placement(
    item: &Item,
    container: &Container,
    origin: Vec3,
    orientation: u8,
    occupants: &[Placed<'_>],
) -> Result<Aabb> {
    item.validate()?;
    container.validate()?;
    let Some(orientation) = Orientation::new(orientation) else {
        return Err(Error::InvalidGeometry(format!(
            "orientation index {orientation} is out of range 0..6"
        )));
    };
    if origin.x < 0.0 || origin.y < 0.0 || origin.z < 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "origin ({}, {}, {}) lies outside container '{}'",
            origin.x, origin.y, origin.z, container.id
        )));
    }

    let bounds = Aabb::new(origin, item.oriented(orientation));
    if !bounds.is_within(&container.dimensions) {
        return Err(Error::InvalidGeometry(format!(
            "item '{}' does not fit inside container '{}' at the given position",
            item.id, container.id
        )));
    }
    if let Some(other) = occupants
        .iter()
        .find(|p| p.item.id != item.id && p.bounds.collides(&bounds))
    {
        return Err(Error::InvalidGeometry(format!(
            "item '{}' would overlap '{}'",
            item.id, other.item.id
        )));
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    #[test]
    fn test_manual_placement_checks() {
        let container = Container::new("C", "Z", 20.0, 20.0, 20.0);
        let resident = Item::new("r", 10.0, 10.0, 10.0);
        let at = Position::new("r", "C", Vec3::ZERO, 0);
        let occupants = [Placed {
            item: &resident,
            position: &at,
            bounds: at.bounds(&resident).unwrap(),
        }];
        let item = Item::new("n", 10.0, 5.0, 20.0);

        // orientation 1 is (10, 20, 5)
        let ok = validate_manual_placement(&item, &container, Vec3::new(10.0, 0.0, 0.0), 1, &occupants).unwrap();
        assert_eq!(ok.size, Vec3::new(10.0, 20.0, 5.0));

        assert!(validate_manual_placement(&item, &container, Vec3::new(5.0, 0.0, 0.0), 0, &occupants).is_err());
        assert!(validate_manual_placement(&item, &container, Vec3::new(15.0, 0.0, 0.0), 0, &occupants).is_err());
        assert!(validate_manual_placement(&item, &container, Vec3::ZERO, 6, &occupants).is_err());
        assert!(validate_manual_placement(&item, &container, Vec3::new(-1.0, 0.0, 0.0), 0, &occupants).is_err());

        // moving the resident within its own container
        let moved = validate_manual_placement(&resident, &container, Vec3::new(5.0, 0.0, 0.0), 0, &occupants);
        assert!(moved.is_ok());
    }
}
