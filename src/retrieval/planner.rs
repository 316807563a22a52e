//! Retrieval sequencing.

use super::graph::BlockingGraph;
use super::types::{BlockerOrdering, RetrievalPlan};
use super::visibility::is_visible;
use crate::model::{resolve_positions, Catalog, Placed};
use crate::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Plans the retrieval of `target` from `container_id` using the current
/// positions in `catalog`.
///
/// # Errors
///
/// [`Error::UnknownItem`] if the target is not in the catalog,
/// [`Error::NotInContainer`] if it has no resolvable position in the
/// container.
pub fn plan_retrieval<C: Catalog + ?Sized>(
    target: &str,
    container_id: &str,
    catalog: &C,
) -> Result<RetrievalPlan> {
    if catalog.item(target).is_none() {
        return Err(Error::UnknownItem(target.to_string()));
    }
    let placed = resolve_positions(catalog.positions_in(container_id), catalog);
    plan_retrieval_in(target, container_id, &placed)
}

/// Plans a retrieval among already resolved placements of one container.
pub fn plan_retrieval_in(
    target: &str,
    container_id: &str,
    placed: &[Placed<'_>],
) -> Result<RetrievalPlan> {
    let Some(target_box) = placed
        .iter()
        .find(|p| p.item.id == target)
        .map(|p| p.bounds)
    else {
        return Err(Error::NotInContainer {
            item: target.to_string(),
            container: container_id.to_string(),
        });
    };

    let others = placed
        .iter()
        .filter(|p| p.item.id != target)
        .map(|p| &p.bounds);
    if is_visible(&target_box, others) {
        return Ok(RetrievalPlan::new(
            target,
            container_id,
            Vec::new(),
            BlockerOrdering::Direct,
        ));
    }

    Ok(plan_from_graph(target, container_id, &BlockingGraph::build(placed)))
}

/// Plans a retrieval from a blocking graph.
///
/// Graphs built from placements are acyclic. A graph with a cycle around
/// the target, which only corrupted or externally supplied blocking data
/// can produce, still yields a plan: its blockers are ordered front to
/// back and the plan is marked [`BlockerOrdering::DepthFallback`].
pub fn plan_from_graph(target: &str, container_id: &str, graph: &BlockingGraph) -> RetrievalPlan {
    let (blockers, topological) = graph.removal_order(target);
    let ordering = if blockers.is_empty() {
        BlockerOrdering::Direct
    } else if topological {
        BlockerOrdering::Topological
    } else {
        BlockerOrdering::DepthFallback
    };
    log::debug!(
        "retrieval of '{target}' from '{container_id}' moves {} item(s)",
        blockers.len()
    );
    RetrievalPlan::new(target, container_id, blockers, ordering)
}

/// One entry of a batch retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub item_id: String,
    pub container_id: String,
}

impl RetrievalRequest {
    pub fn new(item_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            container_id: container_id.into(),
        }
    }
}

/// Plans independent retrievals against the same snapshot.
///
/// Results are returned in request order. With the `parallel` feature the
/// requests are planned on the rayon thread pool.
pub fn plan_many<C>(requests: &[RetrievalRequest], catalog: &C) -> Vec<Result<RetrievalPlan>>
where
    C: Catalog + Sync + ?Sized,
{
    let plan = |r: &RetrievalRequest| plan_retrieval(&r.item_id, &r.container_id, catalog);

    #[cfg(feature = "parallel")]
    let plans = requests.par_iter().map(plan).collect();
    #[cfg(not(feature = "parallel"))]
    let plans = requests.iter().map(plan).collect();
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::model::{Container, Item, Position, Snapshot};
    use crate::retrieval::RetrievalStep;

    fn snapshot(entries: &[(&str, (f64, f64, f64), (f64, f64, f64))]) -> Snapshot {
        let mut snap = Snapshot::new();
        snap.add_container(Container::new("C", "Lab", 100.0, 200.0, 85.0));
        for (id, origin, dims) in entries {
            snap.add_item(Item::new(*id, dims.0, dims.1, dims.2));
            snap.add_position(Position::new(
                *id,
                "C",
                Vec3::new(origin.0, origin.1, origin.2),
                0,
            ));
        }
        snap
    }

    #[test]
    fn test_front_item_single_step() {
        let snap = snapshot(&[("A", (0.0, 0.0, 0.0), (10.0, 10.0, 10.0))]);
        let plan = plan_retrieval("A", "C", &snap).unwrap();
        assert_eq!(plan.steps, vec![RetrievalStep::Retrieve("A".into())]);
        assert_eq!(plan.ordering, BlockerOrdering::Direct);
    }

    #[test]
    fn test_blocked_item() {
        let snap = snapshot(&[
            ("A", (0.0, 0.0, 0.0), (10.0, 10.0, 5.0)),
            ("B", (0.0, 0.0, 5.0), (10.0, 10.0, 5.0)),
        ]);
        let plan = plan_retrieval("B", "C", &snap).unwrap();
        assert_eq!(
            plan.steps,
            vec![
                RetrievalStep::Remove("A".into()),
                RetrievalStep::SetAside("A".into()),
                RetrievalStep::Retrieve("B".into()),
                RetrievalStep::PlaceBack("A".into()),
            ]
        );
        assert_eq!(plan.ordering, BlockerOrdering::Topological);
    }

    #[test]
    fn test_deep_stack() {
        let snap = snapshot(&[
            ("A", (0.0, 0.0, 0.0), (10.0, 10.0, 5.0)),
            ("B", (0.0, 0.0, 5.0), (10.0, 10.0, 5.0)),
            ("T", (0.0, 0.0, 10.0), (10.0, 10.0, 5.0)),
            ("S", (50.0, 0.0, 0.0), (10.0, 10.0, 5.0)),
        ]);
        let plan = plan_retrieval("T", "C", &snap).unwrap();
        let mut blockers = plan.blockers.clone();
        blockers.sort();
        assert_eq!(blockers, vec!["A", "B"]);
        // B is blocked by A, so it comes first in removal order
        assert_eq!(plan.blockers, vec!["B", "A"]);
        assert_eq!(plan.steps.len(), 3 * 2 + 1);
    }

    #[test]
    fn test_missing_target() {
        let snap = snapshot(&[("A", (0.0, 0.0, 0.0), (10.0, 10.0, 5.0))]);
        assert!(matches!(
            plan_retrieval("nope", "C", &snap),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            plan_retrieval("A", "other", &snap),
            Err(Error::NotInContainer { .. })
        ));
    }

    #[test]
    fn test_plan_many_keeps_order() {
        let snap = snapshot(&[
            ("A", (0.0, 0.0, 0.0), (10.0, 10.0, 5.0)),
            ("B", (0.0, 0.0, 5.0), (10.0, 10.0, 5.0)),
        ]);
        let requests = [
            RetrievalRequest::new("B", "C"),
            RetrievalRequest::new("A", "C"),
            RetrievalRequest::new("Z", "C"),
        ];
        let plans = plan_many(&requests, &snap);
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].as_ref().unwrap().blockers, vec!["A"]);
        assert!(plans[1].as_ref().unwrap().is_direct());
        assert!(plans[2].is_err());
    }
}
