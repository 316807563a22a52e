//! Greedy return selection under weight and volume caps.

use super::waste::WasteRecord;
use crate::model::{Catalog, Day, Item, WasteReason};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bonus added to the score of expired waste.
const EXPIRED_BONUS: f64 = 100.0;

/// A waste item ranked for return.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnCandidate {
    pub item_id: String,
    pub reason: WasteReason,
    pub mass: f64,
    pub volume: f64,
    pub score: f64,
}

/// `priority + 2 * days_as_waste + 100 if expired`
pub fn return_priority(item: &Item, record: &WasteRecord, today: Day) -> f64 {
    let bonus = match record.reason {
        WasteReason::Expired => EXPIRED_BONUS,
        WasteReason::Depleted => 0.0,
    };
    f64::from(item.priority) + 2.0 * record.age(today) as f64 + bonus
}

/// Waste records joined with their items, highest score first. Records of
/// unknown items are skipped.
pub fn rank_for_return<C: Catalog + ?Sized>(
    waste: &[WasteRecord],
    catalog: &C,
    today: Day,
) -> Vec<ReturnCandidate> {
    let mut ranked: Vec<ReturnCandidate> = waste
        .iter()
        .filter_map(|record| {
            let Some(item) = catalog.item(&record.item_id) else {
                log::warn!("skipping waste record of unknown item '{}'", record.item_id);
                return None;
            };
            Some(ReturnCandidate {
                item_id: item.id.clone(),
                reason: record.reason,
                mass: item.mass,
                volume: item.volume(),
                score: return_priority(item, record, today),
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    ranked
}

/// Takes candidates in order, skipping any that would push either running
/// total past its cap.
pub fn select_within_caps(ranked: &[ReturnCandidate], max_weight: f64, max_volume: f64) -> Vec<ReturnCandidate> {
    let mut weight = 0.0;
    let mut volume = 0.0;
    let mut selected = Vec::new();
    for candidate in ranked {
        if weight + candidate.mass <= max_weight && volume + candidate.volume <= max_volume {
            weight += candidate.mass;
            volume += candidate.volume;
            selected.push(candidate.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Snapshot;
    use approx::assert_relative_eq;

    fn candidate(id: &str, mass: f64, volume: f64, score: f64) -> ReturnCandidate {
        ReturnCandidate {
            item_id: id.into(),
            reason: WasteReason::Depleted,
            mass,
            volume,
            score,
        }
    }

    #[test]
    fn test_priority_formula() {
        let item = Item::new("x", 1.0, 1.0, 1.0).with_priority(40);
        let expired = WasteRecord::new("x", WasteReason::Expired, Day(2));
        let depleted = WasteRecord::new("x", WasteReason::Depleted, Day(2));
        assert_relative_eq!(return_priority(&item, &expired, Day(5)), 146.0);
        assert_relative_eq!(return_priority(&item, &depleted, Day(5)), 46.0);
    }

    #[test]
    fn test_ranking_skips_unknown_items() {
        let mut snap = Snapshot::new();
        snap.add_item(Item::new("a", 1.0, 1.0, 1.0).with_priority(10));
        snap.add_item(Item::new("b", 1.0, 1.0, 1.0).with_priority(90));
        let waste = [
            WasteRecord::new("a", WasteReason::Expired, Day(0)),
            WasteRecord::new("b", WasteReason::Depleted, Day(0)),
            WasteRecord::new("ghost", WasteReason::Expired, Day(0)),
        ];
        let ranked = rank_for_return(&waste, &snap, Day(0));
        let ids: Vec<_> = ranked.iter().map(|c| c.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_caps_are_respected() {
        let ranked = [
            candidate("heavy", 8.0, 1.0, 300.0),
            candidate("bulky", 1.0, 9.0, 200.0),
            candidate("light", 1.0, 1.0, 100.0),
            candidate("last", 1.0, 1.0, 50.0),
        ];
        let selected = select_within_caps(&ranked, 10.0, 5.0);
        let ids: Vec<_> = selected.iter().map(|c| c.item_id.as_str()).collect();
        // bulky breaks the volume cap, the rest fit
        assert_eq!(ids, vec!["heavy", "light", "last"]);

        assert!(select_within_caps(&ranked, 0.0, 0.0).is_empty());
    }
}
