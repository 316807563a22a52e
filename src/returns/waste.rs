//! Waste identification.

use crate::model::{Day, Item, ItemStatus, WasteReason};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An item taken out of service and the day it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WasteRecord {
    pub item_id: String,
    pub reason: WasteReason,
    pub marked_on: Day,
}

impl WasteRecord {
    pub fn new(item_id: impl Into<String>, reason: WasteReason, marked_on: Day) -> Self {
        Self {
            item_id: item_id.into(),
            reason,
            marked_on,
        }
    }

    /// Whole days the item has been waste as of `today`.
    pub fn age(&self, today: Day) -> i64 {
        today.days_since(self.marked_on)
    }
}

/// Active items that became waste as of `today`.
///
/// Expiry takes precedence over depletion. Items that are no longer
/// active are skipped; an item depleted through
/// [`Item::record_usage`] has already left active service and should be
/// recorded by whoever recorded the usage.
pub fn identify_waste<'a>(items: impl IntoIterator<Item = &'a Item>, today: Day) -> Vec<WasteRecord> {
    items
        .into_iter()
        .filter(|item| item.status == ItemStatus::Active)
        .filter_map(|item| {
            let reason = if item.is_expired(today) {
                WasteReason::Expired
            } else if item.is_depleted() {
                WasteReason::Depleted
            } else {
                return None;
            };
            Some(WasteRecord::new(&item.id, reason, today))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifies_expired_and_depleted() {
        let mut used_up = Item::new("used", 1.0, 1.0, 1.0).with_usage_limit(2);
        used_up.usage_count = 2;
        let items = vec![
            Item::new("fresh", 1.0, 1.0, 1.0).with_expiry(Day(10)),
            Item::new("stale", 1.0, 1.0, 1.0).with_expiry(Day(5)),
            Item::new("today", 1.0, 1.0, 1.0).with_expiry(Day(7)),
            used_up,
            Item::new("gone", 1.0, 1.0, 1.0)
                .with_expiry(Day(1))
                .with_status(ItemStatus::Waste),
        ];

        let records = identify_waste(&items, Day(7));
        let ids: Vec<_> = records.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["stale", "today", "used"]);
        assert_eq!(records[0].reason, WasteReason::Expired);
        assert_eq!(records[2].reason, WasteReason::Depleted);
        assert!(records.iter().all(|r| r.marked_on == Day(7)));
    }

    #[test]
    fn test_age() {
        let record = WasteRecord::new("x", WasteReason::Expired, Day(3));
        assert_eq!(record.age(Day(10)), 7);
        assert_eq!(record.age(Day(1)), 0);
    }
}
