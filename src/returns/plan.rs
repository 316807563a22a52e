//! Return plans and undocking.

use super::selection::{rank_for_return, select_within_caps};
use super::waste::WasteRecord;
use crate::model::{AuditAction, AuditEntry, Catalog, Day, PlacementSink, WasteReason};
use crate::retrieval::{plan_retrieval, RetrievalPlan};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a return shipment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnRequest {
    /// Container that leaves the station with the waste.
    pub undocking_container_id: String,
    /// Day used to decide expiry.
    pub today: Day,
    /// Weight cap of the shipment.
    pub max_weight: f64,
    /// Defaults to the volume of the undocking container.
    pub max_volume: Option<f64>,
}

impl ReturnRequest {
    pub fn new(undocking_container_id: impl Into<String>, today: Day, max_weight: f64) -> Self {
        Self {
            undocking_container_id: undocking_container_id.into(),
            today,
            max_weight,
            max_volume: None,
        }
    }

    /// Caps the shipment volume below the container volume.
    pub fn with_max_volume(mut self, max_volume: f64) -> Self {
        self.max_volume = Some(max_volume);
        self
    }
}

/// Move of one waste item into the undocking container.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnMove {
    /// 1-based.
    pub step: usize,
    pub item_id: String,
    /// Container the item sits in now.
    pub from_container: String,
    /// The undocking container.
    pub to_container: String,
}

/// One waste item on the manifest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifestEntry {
    pub item_id: String,
    /// Why the item counts as waste.
    pub reason: WasteReason,
    pub mass: f64,
    /// Volume of the item's box.
    pub volume: f64,
}

/// What leaves with the undocking container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnManifest {
    pub undocking_container_id: String,
    /// Selected items in ranking order.
    pub items: Vec<ManifestEntry>,
    /// Sum of the selected masses.
    pub total_weight: f64,
    /// Sum of the selected volumes.
    pub total_volume: f64,
    /// `total_weight / max_weight`, 0 for a zero cap.
    pub weight_utilization: f64,
    /// `total_volume / max_volume`, 0 for a zero cap.
    pub volume_utilization: f64,
}

/// Moves, extraction plans and manifest of one return shipment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnPlan {
    /// Numbered moves into the undocking container.
    pub moves: Vec<ReturnMove>,
    /// Extraction plans for selected items that are blocked where they sit.
    pub retrievals: Vec<RetrievalPlan>,
    pub manifest: ReturnManifest,
}

/// Selects waste for return and plans its way into the undocking
/// container.
///
/// Every selected item is listed in the manifest. Items already inside the
/// undocking container or without a current position get no move.
///
/// # Errors
///
/// [`Error::UnknownContainer`] if the undocking container is not in the
/// catalog, [`Error::ConfigError`] for a negative cap.
pub fn plan_return<C: Catalog + ?Sized>(
    waste: &[WasteRecord],
    request: &ReturnRequest,
    catalog: &C,
) -> Result<ReturnPlan> {
    let target_id = request.undocking_container_id.as_str();
    let Some(target) = catalog.container(target_id) else {
        return Err(Error::UnknownContainer(target_id.to_string()));
    };
    let max_volume = request.max_volume.unwrap_or_else(|| target.volume());
    if request.max_weight < 0.0 || max_volume < 0.0 {
        return Err(Error::ConfigError(format!(
            "return caps must be non-negative, got weight {} and volume {max_volume}",
            request.max_weight
        )));
    }

    let ranked = rank_for_return(waste, catalog, request.today);
    let selected = select_within_caps(&ranked, request.max_weight, max_volume);

    let mut moves = Vec::new();
    let mut retrievals = Vec::new();
    for candidate in &selected {
        let Some(position) = catalog.position_of(&candidate.item_id) else {
            continue;
        };
        if position.container_id == target_id {
            continue;
        }
        let retrieval = match plan_retrieval(&candidate.item_id, &position.container_id, catalog) {
            Ok(retrieval) => retrieval,
            Err(e) => {
                log::warn!("cannot move '{}' for return: {e}", candidate.item_id);
                continue;
            }
        };
        if !retrieval.is_direct() {
            retrievals.push(retrieval);
        }
        moves.push(ReturnMove {
            step: moves.len() + 1,
            item_id: candidate.item_id.clone(),
            from_container: position.container_id.clone(),
            to_container: target_id.to_string(),
        });
    }

    let total_weight: f64 = selected.iter().map(|c| c.mass).sum();
    let total_volume: f64 = selected.iter().map(|c| c.volume).sum();
    let ratio = |total: f64, cap: f64| if cap > 0.0 { total / cap } else { 0.0 };
    let manifest = ReturnManifest {
        undocking_container_id: target_id.to_string(),
        items: selected
            .iter()
            .map(|c| ManifestEntry {
                item_id: c.item_id.clone(),
                reason: c.reason,
                mass: c.mass,
                volume: c.volume,
            })
            .collect(),
        total_weight,
        total_volume,
        weight_utilization: ratio(total_weight, request.max_weight),
        volume_utilization: ratio(total_volume, max_volume),
    };

    log::info!(
        "return via '{target_id}': {} of {} waste item(s) selected, {} move(s)",
        manifest.items.len(),
        waste.len(),
        moves.len()
    );
    Ok(ReturnPlan {
        moves,
        retrievals,
        manifest,
    })
}

/// Summary of a completed undocking.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UndockingReport {
    pub container_id: String,
    pub removed: Vec<String>,
}

/// Removes every position in the undocking container and records a
/// disposal for each removed item.
///
/// # Errors
///
/// [`Error::UnknownContainer`] if the container is not in the catalog.
pub fn complete_undocking<S>(container_id: &str, store: &mut S) -> Result<UndockingReport>
where
    S: Catalog + PlacementSink + ?Sized,
{
    if store.container(container_id).is_none() {
        return Err(Error::UnknownContainer(container_id.to_string()));
    }
    let ids: Vec<String> = store
        .positions_in(container_id)
        .into_iter()
        .map(|p| p.item_id.clone())
        .collect();

    let mut removed = Vec::with_capacity(ids.len());
    for id in ids {
        if store.remove_position(&id).is_some() {
            store.append_audit(AuditEntry::new(
                AuditAction::Disposal,
                &id,
                format!("undocked with container '{container_id}'"),
            ));
            removed.push(id);
        }
    }
    log::info!("undocked '{container_id}' with {} item(s)", removed.len());
    Ok(UndockingReport {
        container_id: container_id.to_string(),
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::model::{Container, Item, Position, Snapshot};
    use crate::retrieval::RetrievalStep;
    use approx::assert_relative_eq;

    fn station() -> Snapshot {
        let mut snap = Snapshot::new();
        snap.add_container(Container::new("S", "Storage", 10.0, 10.0, 30.0));
        snap.add_container(Container::new("U", "Airlock", 20.0, 20.0, 20.0));
        snap.add_item(Item::new("front", 10.0, 10.0, 10.0).with_mass(2.0).with_priority(50));
        snap.add_item(Item::new("back", 10.0, 10.0, 10.0).with_mass(3.0).with_priority(20));
        snap.add_item(Item::new("docked", 5.0, 5.0, 5.0).with_mass(1.0).with_priority(10));
        snap.add_item(Item::new("loose", 5.0, 5.0, 5.0).with_mass(1.0).with_priority(5));
        snap.add_position(Position::new("front", "S", Vec3::ZERO, 0).with_visible(true));
        snap.add_position(Position::new("back", "S", Vec3::new(0.0, 0.0, 10.0), 0));
        snap.add_position(Position::new("docked", "U", Vec3::ZERO, 0).with_visible(true));
        snap
    }

    #[test]
    fn test_plan_return() {
        let snap = station();
        let waste = [
            WasteRecord::new("back", WasteReason::Expired, Day(1)),
            WasteRecord::new("docked", WasteReason::Depleted, Day(1)),
            WasteRecord::new("loose", WasteReason::Depleted, Day(1)),
        ];
        let request = ReturnRequest::new("U", Day(4), 10.0);
        let plan = plan_return(&waste, &request, &snap).unwrap();

        assert_eq!(plan.manifest.items.len(), 3);
        assert_eq!(plan.manifest.items[0].item_id, "back");
        assert_relative_eq!(plan.manifest.total_weight, 5.0);
        assert_relative_eq!(plan.manifest.weight_utilization, 0.5);
        assert_relative_eq!(plan.manifest.volume_utilization, 1250.0 / 8000.0);

        // "docked" is already there and "loose" has no position
        assert_eq!(plan.moves.len(), 1);
        assert_eq!(plan.moves[0].step, 1);
        assert_eq!(plan.moves[0].from_container, "S");

        assert_eq!(plan.retrievals.len(), 1);
        assert_eq!(
            plan.retrievals[0].steps,
            vec![
                RetrievalStep::Remove("front".into()),
                RetrievalStep::SetAside("front".into()),
                RetrievalStep::Retrieve("back".into()),
                RetrievalStep::PlaceBack("front".into()),
            ]
        );
    }

    #[test]
    fn test_caps_limit_selection() {
        let snap = station();
        let waste = [
            WasteRecord::new("back", WasteReason::Expired, Day(1)),
            WasteRecord::new("docked", WasteReason::Depleted, Day(1)),
        ];
        let request = ReturnRequest::new("U", Day(1), 2.0).with_max_volume(500.0);
        let plan = plan_return(&waste, &request, &snap).unwrap();
        assert_eq!(plan.manifest.items.len(), 1);
        assert_eq!(plan.manifest.items[0].item_id, "docked");
        assert!(plan.manifest.total_weight <= 2.0);
        assert!(plan.manifest.total_volume <= 500.0);
    }

    #[test]
    fn test_unknown_container() {
        let snap = station();
        let request = ReturnRequest::new("nowhere", Day(0), 10.0);
        assert!(matches!(
            plan_return(&[], &request, &snap),
            Err(Error::UnknownContainer(_))
        ));
    }

    #[test]
    fn test_zero_caps_report_zero_utilization() {
        let snap = station();
        let request = ReturnRequest::new("U", Day(0), 0.0).with_max_volume(0.0);
        let plan = plan_return(&[], &request, &snap).unwrap();
        assert_eq!(plan.manifest.weight_utilization, 0.0);
        assert_eq!(plan.manifest.volume_utilization, 0.0);
    }

    #[test]
    fn test_complete_undocking() {
        let mut snap = station();
        let report = complete_undocking("U", &mut snap).unwrap();
        assert_eq!(report.removed, vec!["docked".to_string()]);
        assert!(snap.positions_in("U").is_empty());
        assert_eq!(snap.positions_in("S").len(), 2);
        assert_eq!(snap.audit_log().len(), 1);
        assert_eq!(snap.audit_log()[0].action, AuditAction::Disposal);

        assert!(complete_undocking("nowhere", &mut snap).is_err());
    }
}
