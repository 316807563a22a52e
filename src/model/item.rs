//! Cargo items.

use crate::geometry::Vec3;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mission-day stamp (days since the mission epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Day(pub i64);

impl Day {
    /// Whole days from `earlier` to `self`, never negative.
    pub fn days_since(self, earlier: Day) -> i64 {
        (self.0 - earlier.0).max(0)
    }
}

/// Lifecycle status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemStatus {
    /// In service.
    #[default]
    Active,
    /// Expired or otherwise marked for disposal.
    Waste,
    /// Usage limit reached.
    Depleted,
}

/// Why an item was marked as waste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WasteReason {
    /// Past its expiry day.
    Expired,
    /// Usage limit reached.
    Depleted,
}

/// One of the six axis permutations of an item's dimensions.
///
/// Index order: `(w,h,d) (w,d,h) (h,w,d) (h,d,w) (d,w,h) (d,h,w)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orientation(u8);

impl Orientation {
    /// All six orientations in index order.
    pub const ALL: [Orientation; 6] = [
        Orientation(0),
        Orientation(1),
        Orientation(2),
        Orientation(3),
        Orientation(4),
        Orientation(5),
    ];

    /// Returns the orientation for a raw index, or `None` if out of range.
    pub fn new(index: u8) -> Option<Self> {
        (index < 6).then_some(Orientation(index))
    }

    /// Raw index in `0..6`.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Applies the permutation to nominal `(w, h, d)` dimensions.
    pub fn apply(self, dims: Vec3) -> Vec3 {
        let Vec3 { x: w, y: h, z: d } = dims;
        match self.0 {
            0 => Vec3::new(w, h, d),
            1 => Vec3::new(w, d, h),
            2 => Vec3::new(h, w, d),
            3 => Vec3::new(h, d, w),
            4 => Vec3::new(d, w, h),
            _ => Vec3::new(d, h, w),
        }
    }
}

/// A cargo item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Unique identifier.
    pub id: String,
    /// Nominal dimensions: width, height, depth.
    pub dimensions: Vec3,
    /// Mass in kilograms.
    pub mass: f64,
    /// Importance from 1 to 100, higher is more important.
    pub priority: u8,
    /// Zone the item should preferably be stored in.
    pub preferred_zone: Option<String>,
    /// Day on which the item expires.
    pub expiry: Option<Day>,
    /// Number of uses before the item is depleted.
    pub usage_limit: Option<u32>,
    /// Uses recorded so far.
    pub usage_count: u32,
    /// Lifecycle status.
    pub status: ItemStatus,
}

impl Item {
    /// Creates an active item with priority 50 and zero mass.
    pub fn new(id: impl Into<String>, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id: id.into(),
            dimensions: Vec3::new(width, height, depth),
            mass: 0.0,
            priority: 50,
            preferred_zone: None,
            expiry: None,
            usage_limit: None,
            usage_count: 0,
            status: ItemStatus::Active,
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_preferred_zone(mut self, zone: impl Into<String>) -> Self {
        self.preferred_zone = Some(zone.into());
        self
    }

    pub fn with_expiry(mut self, day: Day) -> Self {
        self.expiry = Some(day);
        self
    }

    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Nominal volume.
    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// The six candidate placement dimensions, indexed like [`Orientation`].
    pub fn possible_orientations(&self) -> [Vec3; 6] {
        Orientation::ALL.map(|o| o.apply(self.dimensions))
    }

    /// Dimensions in the given orientation.
    pub fn oriented(&self, orientation: Orientation) -> Vec3 {
        orientation.apply(self.dimensions)
    }

    /// Returns true if the item fits inside `extent` in at least one
    /// orientation.
    pub fn fits_in(&self, extent: &Vec3) -> bool {
        self.possible_orientations()
            .iter()
            .any(|dims| dims.fits_within(extent))
    }

    /// Checks dimensions, mass and priority.
    pub fn validate(&self) -> Result<()> {
        if !self.dimensions.is_positive() {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for item '{}' must be positive",
                self.id
            )));
        }
        if self.mass < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "Mass for item '{}' cannot be negative",
                self.id
            )));
        }
        if !(1..=100).contains(&self.priority) {
            return Err(Error::InvalidGeometry(format!(
                "Priority for item '{}' must be in 1..=100, got {}",
                self.id, self.priority
            )));
        }
        Ok(())
    }

    /// True if the item has an expiry day on or before `today`.
    pub fn is_expired(&self, today: Day) -> bool {
        self.expiry.is_some_and(|day| today >= day)
    }

    /// True if the item has reached its usage limit.
    pub fn is_depleted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Records `uses` uses. Returns true if this call depleted the item.
    ///
    /// Items without a usage limit are not counted.
    pub fn record_usage(&mut self, uses: u32) -> bool {
        let Some(limit) = self.usage_limit else {
            return false;
        };
        let was_depleted = self.usage_count >= limit;
        self.usage_count = self.usage_count.saturating_add(uses);
        if self.usage_count >= limit {
            self.status = ItemStatus::Depleted;
            return !was_depleted;
        }
        false
    }

    /// Moves the item out of active service.
    pub fn mark_waste(&mut self, reason: WasteReason) {
        self.status = match reason {
            WasteReason::Expired => ItemStatus::Waste,
            WasteReason::Depleted => ItemStatus::Depleted,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_volume_and_orientations() {
        let item = Item::new("I1", 10.0, 20.0, 30.0);
        assert_relative_eq!(item.volume(), 6000.0);

        let dims = item.possible_orientations();
        assert_eq!(dims[0], Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(dims[1], Vec3::new(10.0, 30.0, 20.0));
        assert_eq!(dims[2], Vec3::new(20.0, 10.0, 30.0));
        assert_eq!(dims[3], Vec3::new(20.0, 30.0, 10.0));
        assert_eq!(dims[4], Vec3::new(30.0, 10.0, 20.0));
        assert_eq!(dims[5], Vec3::new(30.0, 20.0, 10.0));
        for d in dims {
            assert_relative_eq!(d.volume(), 6000.0);
        }
    }

    #[test]
    fn test_orientation_range() {
        assert!(Orientation::new(5).is_some());
        assert!(Orientation::new(6).is_none());
    }

    #[test]
    fn test_fits_in_rotated() {
        let long = Item::new("rod", 50.0, 5.0, 5.0);
        assert!(long.fits_in(&Vec3::new(10.0, 60.0, 10.0)));
        assert!(!long.fits_in(&Vec3::new(10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_validation() {
        assert!(Item::new("ok", 1.0, 1.0, 1.0).validate().is_ok());
        assert!(Item::new("flat", 1.0, 0.0, 1.0).validate().is_err());
        assert!(Item::new("heavy", 1.0, 1.0, 1.0)
            .with_mass(-1.0)
            .validate()
            .is_err());
        assert!(Item::new("p0", 1.0, 1.0, 1.0)
            .with_priority(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_expiry() {
        let item = Item::new("food", 1.0, 1.0, 1.0).with_expiry(Day(10));
        assert!(!item.is_expired(Day(9)));
        assert!(item.is_expired(Day(10)));
        assert!(!Item::new("tool", 1.0, 1.0, 1.0).is_expired(Day(1000)));
    }

    #[test]
    fn test_usage_depletes_once() {
        let mut item = Item::new("wipes", 1.0, 1.0, 1.0).with_usage_limit(2);
        assert!(!item.record_usage(1));
        assert_eq!(item.status, ItemStatus::Active);
        assert!(item.record_usage(1));
        assert_eq!(item.status, ItemStatus::Depleted);
        assert!(!item.record_usage(1));
        assert!(item.is_depleted());

        let mut unlimited = Item::new("tool", 1.0, 1.0, 1.0);
        assert!(!unlimited.record_usage(5));
        assert_eq!(unlimited.usage_count, 0);
    }

    #[test]
    fn test_mark_waste() {
        let mut item = Item::new("x", 1.0, 1.0, 1.0);
        item.mark_waste(WasteReason::Expired);
        assert_eq!(item.status, ItemStatus::Waste);
        item.mark_waste(WasteReason::Depleted);
        assert_eq!(item.status, ItemStatus::Depleted);
    }
}
