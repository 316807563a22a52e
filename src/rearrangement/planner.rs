//! Rearrangement planning entry points.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::config::RearrangementConfig;
use super::movability::identify_movable_items;
use super::selection::{SelectionProblem, SelectionState};
use super::types::{MoveStep, RearrangementOutcome, RearrangementPlan};
use crate::anneal::Annealer;
use crate::model::{Container, Item, Placed};
use crate::random::rng_from;
use crate::{Error, Result};

/// Plans which occupants of `container` to move out so that `new_items`
/// fit by volume.
///
/// A missing or unacceptable plan is reported as
/// [`RearrangementOutcome::NoFeasiblePlan`].
///
/// # Errors
///
/// [`Error::ConfigError`] for an invalid configuration.
pub fn plan_rearrangement(
    container: &Container,
    new_items: &[Item],
    occupants: &[Placed<'_>],
    config: &RearrangementConfig,
) -> Result<RearrangementOutcome> {
    plan_rearrangement_with_cancel(container, new_items, occupants, config, None)
}

/// Like [`plan_rearrangement`], checking `cancel` between annealing steps.
///
/// # Errors
///
/// [`Error::Cancelled`] once the flag is observed set.
pub fn plan_rearrangement_with_cancel(
    container: &Container,
    new_items: &[Item],
    occupants: &[Placed<'_>],
    config: &RearrangementConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RearrangementOutcome> {
    config.validate()?;
    if new_items.is_empty() {
        return Ok(RearrangementOutcome::infeasible("no new items to accommodate"));
    }
    if container.volume() <= 0.0 {
        return Ok(RearrangementOutcome::infeasible(format!(
            "container '{}' has no volume",
            container.id
        )));
    }

    let needed: f64 = new_items.iter().map(Item::volume).sum();
    let movable = identify_movable_items(container, new_items, occupants, config);
    if movable.is_empty() {
        return Ok(RearrangementOutcome::infeasible(format!(
            "no suitable items to move in '{}'",
            container.id
        )));
    }

    let Some(problem) = SelectionProblem::new(&movable, needed, config) else {
        let available: f64 = movable.iter().map(|m| m.volume).sum();
        return Ok(RearrangementOutcome::infeasible(format!(
            "movable items free {available:.1} of {needed:.1} needed"
        )));
    };

    let anneal = config.effective_anneal();
    let runs = config.restarts.min(2 * movable.len()).max(1);
    let mut rng = rng_from(anneal.seed);
    let mut best: Option<(SelectionState, f64)> = None;
    for _ in 0..runs {
        let result = Annealer::run_with_rng(&problem, &anneal, &mut rng, cancel.clone())?;
        if result.cancelled {
            return Err(Error::Cancelled);
        }
        let score = problem.score(&result.best);
        if best.as_ref().is_none_or(|(_, s)| score > *s) {
            best = Some((result.best, score));
        }
        if score > config.early_exit_score {
            break;
        }
    }

    let Some((state, score)) = best else {
        return Ok(RearrangementOutcome::infeasible("annealing produced no selection"));
    };
    if score < config.acceptance_floor {
        log::debug!(
            "rejecting rearrangement of '{}': score {score:.3} below {:.2}",
            container.id,
            config.acceptance_floor
        );
        return Ok(RearrangementOutcome::infeasible(format!(
            "best plan scored {score:.3}, below the acceptance floor {:.2}",
            config.acceptance_floor
        )));
    }

    let mut chosen: Vec<&Placed<'_>> = state.selected.iter().map(|&i| &movable[i].placed).collect();
    chosen.sort_by(|a, b| {
        a.bounds
            .origin
            .z
            .total_cmp(&b.bounds.origin.z)
            .then_with(|| a.item.id.cmp(&b.item.id))
    });

    let steps: Vec<MoveStep> = chosen
        .iter()
        .map(|p| MoveStep {
            item_id: p.item.id.clone(),
            from_container: container.id.clone(),
            from: p.bounds,
            to: None,
        })
        .collect();

    log::info!(
        "rearrangement of '{}' moves {} item(s), score {score:.3}",
        container.id,
        steps.len()
    );

    Ok(RearrangementOutcome::Planned(RearrangementPlan {
        container_id: container.id.clone(),
        items_to_move: steps.iter().map(|s| s.item_id.clone()).collect(),
        steps,
        freed_volume: state.freed_volume,
        needed_volume: needed,
        resulting_space: state.freed_volume - needed,
        score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::model::Position;
    use std::sync::atomic::Ordering;

    struct Shelf {
        container: Container,
        items: Vec<Item>,
        positions: Vec<Position>,
    }

    impl Shelf {
        fn new(container: Container, boxes: &[(&str, Vec3, Vec3, u8)]) -> Self {
            let items = boxes
                .iter()
                .map(|(id, _, size, prio)| Item::new(*id, size.x, size.y, size.z).with_priority(*prio))
                .collect();
            let positions = boxes
                .iter()
                .map(|(id, origin, _, _)| Position::new(*id, &container.id, *origin, 0))
                .collect();
            Self {
                container,
                items,
                positions,
            }
        }

        fn placed(&self) -> Vec<Placed<'_>> {
            self.items
                .iter()
                .zip(&self.positions)
                .map(|(item, position)| Placed {
                    item,
                    position,
                    bounds: position.bounds(item).unwrap(),
                })
                .collect()
        }
    }

    fn small_cubes() -> Shelf {
        let side = Vec3::new(10.0, 10.0, 10.0);
        Shelf::new(
            Container::new("C", "Z", 50.0, 50.0, 50.0),
            &[
                ("p10", Vec3::new(0.0, 0.0, 20.0), side, 10),
                ("p12", Vec3::new(10.0, 0.0, 0.0), side, 12),
                ("p14", Vec3::new(20.0, 0.0, 0.0), side, 14),
                ("p16", Vec3::new(30.0, 0.0, 0.0), side, 16),
                ("p18", Vec3::new(40.0, 0.0, 0.0), side, 18),
                ("big", Vec3::new(0.0, 20.0, 0.0), Vec3::new(20.0, 20.0, 20.0), 20),
            ],
        )
    }

    #[test]
    fn test_picks_cheapest_feasible_selection() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let new_items = [Item::new("new", 10.0, 10.0, 15.0).with_priority(80)];
        let config = RearrangementConfig::default().with_seed(42);

        let outcome = plan_rearrangement(&shelf.container, &new_items, &placed, &config).unwrap();
        let plan = outcome.plan().expect("plan expected");
        assert_eq!(plan.items_to_move.len(), 2);
        assert!(plan.items_to_move.contains(&"p10".to_string()));
        assert!(plan.items_to_move.contains(&"p12".to_string()));
        // front to back
        assert_eq!(plan.items_to_move[0], "p12");
        assert!(plan.freed_volume >= plan.needed_volume);
        assert!(plan.resulting_space >= 0.0);
        assert!(plan.score >= 0.5);
        assert!(plan.steps.iter().all(|s| s.to.is_none()));
    }

    #[test]
    fn test_insufficient_volume_is_not_an_error() {
        let shelf = Shelf::new(
            Container::new("C", "Z", 100.0, 200.0, 85.0),
            &[
                ("a", Vec3::ZERO, Vec3::new(10.0, 20.0, 15.0), 20),
                ("b", Vec3::new(20.0, 0.0, 0.0), Vec3::new(15.0, 25.0, 10.0), 30),
            ],
        );
        let placed = shelf.placed();
        let new_items = [Item::new("new", 40.0, 40.0, 40.0).with_priority(90)];
        let outcome =
            plan_rearrangement(&shelf.container, &new_items, &placed, &RearrangementConfig::default()).unwrap();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_no_new_items() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let outcome = plan_rearrangement(&shelf.container, &[], &placed, &RearrangementConfig::default()).unwrap();
        assert!(matches!(outcome, RearrangementOutcome::NoFeasiblePlan { .. }));
    }

    #[test]
    fn test_nothing_movable() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let new_items = [Item::new("new", 5.0, 5.0, 5.0).with_priority(1)];
        let outcome =
            plan_rearrangement(&shelf.container, &new_items, &placed, &RearrangementConfig::default()).unwrap();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_low_scores_are_rejected() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let new_items = [Item::new("new", 10.0, 10.0, 15.0).with_priority(80)];
        let config = RearrangementConfig::default()
            .with_seed(1)
            .with_acceptance_floor(0.99)
            .with_early_exit_score(1.0);
        let outcome = plan_rearrangement(&shelf.container, &new_items, &placed, &config).unwrap();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_cancellation() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let new_items = [Item::new("new", 10.0, 10.0, 15.0).with_priority(80)];
        let cancel = Arc::new(AtomicBool::new(false));
        cancel.store(true, Ordering::Relaxed);
        let result = plan_rearrangement_with_cancel(
            &shelf.container,
            &new_items,
            &placed,
            &RearrangementConfig::default().with_seed(3),
            Some(cancel),
        );
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_same_seed_same_plan() {
        let shelf = small_cubes();
        let placed = shelf.placed();
        let new_items = [Item::new("new", 20.0, 10.0, 10.0).with_priority(70)];
        let config = RearrangementConfig::default().with_seed(9);
        let a = plan_rearrangement(&shelf.container, &new_items, &placed, &config).unwrap();
        let b = plan_rearrangement(&shelf.container, &new_items, &placed, &config).unwrap();
        assert_eq!(a, b);
    }
}
