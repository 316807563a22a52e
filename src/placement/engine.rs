//! Batch placement.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::cache::{ContainerState, GridCache};
use super::config::PlacementConfig;
use super::score::PlacementScorer;
use super::search::{best_position, Candidate};
use super::types::{PlacementOutcome, PlacementRecord, Unplaced, UnplacedReason};
use crate::model::{Catalog, Container, Item};
use crate::rearrangement::{plan_displacement, Destination, MoveStep, Occupant};
use crate::retrieval::is_visible;
use crate::Result;

/// Places batches of items into containers.
///
/// Items are handled in descending `(priority, volume)` order. Each item
/// goes to the highest-scoring free position among the containers of its
/// preferred zone, or among all containers if none of those has room.
/// When nothing is free anywhere, lower-priority items that were stowed
/// before the run may be moved elsewhere to clear a slot.
///
/// # Examples
///
/// ```
/// use u_stowage::model::{Container, Item, Snapshot};
/// use u_stowage::placement::{PlacementConfig, PlacementEngine};
///
/// let engine = PlacementEngine::new(PlacementConfig::default()).unwrap();
/// let items = vec![Item::new("kit", 10.0, 10.0, 10.0).with_priority(80)];
/// let containers = vec![Container::new("A", "Lab", 50.0, 50.0, 50.0)];
///
/// let outcome = engine.place(&items, &containers, &Snapshot::new());
/// assert!(outcome.is_complete());
/// assert_eq!(outcome.placements[0].container_id, "A");
/// ```
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: PlacementConfig,
}

/// A slot cleared by displacement, with the containers it touched.
struct Rearranged {
    container_id: String,
    candidate: Candidate,
    steps: Vec<MoveStep>,
    states: HashMap<String, ContainerState>,
}

impl PlacementEngine {
    /// # Errors
    ///
    /// [`crate::Error::ConfigError`] if the configuration is invalid.
    pub fn new(config: PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Places `items` into `containers`, reading existing positions from
    /// `catalog`.
    pub fn place<C: Catalog + ?Sized>(
        &self,
        items: &[Item],
        containers: &[Container],
        catalog: &C,
    ) -> PlacementOutcome {
        self.place_with_cancel(items, containers, catalog, None)
    }

    /// Like [`place`](Self::place). Once `cancel` is set, the item being
    /// searched and all remaining items are reported as
    /// [`UnplacedReason::Cancelled`]; accepted placements are kept.
    pub fn place_with_cancel<C: Catalog + ?Sized>(
        &self,
        items: &[Item],
        containers: &[Container],
        catalog: &C,
        cancel: Option<Arc<AtomicBool>>,
    ) -> PlacementOutcome {
        let cancel = cancel.as_deref();
        let mut order: Vec<&Item> = items.iter().collect();
        order.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.volume().total_cmp(&a.volume()))
        });

        let mut by_zone: HashMap<&str, Vec<&Container>> = HashMap::new();
        for container in containers {
            by_zone.entry(container.zone.as_str()).or_default().push(container);
        }

        // items of the batch are re-placed, so their old positions are ignored
        let exclude: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        let mut cache = GridCache::new(self.config.resolution);
        let mut outcome = PlacementOutcome::default();

        for item in order {
            let cancelled = cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
            if cancelled {
                outcome.unplaced.push(unplaced(item, UnplacedReason::Cancelled));
                continue;
            }
            if let Err(e) = item.validate() {
                log::debug!("skipping item: {e}");
                outcome.unplaced.push(unplaced(item, UnplacedReason::InvalidDimensions));
                continue;
            }

            let fitting: Vec<&Container> = containers
                .iter()
                .filter(|c| item.fits_in(&c.dimensions))
                .collect();
            if fitting.is_empty() {
                log::debug!("item '{}' is larger than every container", item.id);
                outcome.unplaced.push(unplaced(item, UnplacedReason::NoFittingContainer));
                continue;
            }

            let preferred: Vec<&Container> = item
                .preferred_zone
                .as_deref()
                .and_then(|zone| by_zone.get(zone))
                .map(|zone| {
                    zone.iter()
                        .copied()
                        .filter(|c| item.fits_in(&c.dimensions))
                        .collect()
                })
                .unwrap_or_default();
            let others: Vec<&Container> = fitting
                .iter()
                .copied()
                .filter(|c| !preferred.iter().any(|p| p.id == c.id))
                .collect();

            let mut found = None;
            for group in [&preferred, &others] {
                found = self.best_in(item, group, catalog, &exclude, &mut cache, cancel);
                if found.is_some() {
                    break;
                }
            }

            if let Some((container, candidate)) = found {
                commit(&mut cache, container, catalog, &exclude, item, &candidate);
                outcome.placements.push(record(item, &container.id, &candidate, false));
                continue;
            }
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                outcome.unplaced.push(unplaced(item, UnplacedReason::Cancelled));
                continue;
            }

            if self.config.allow_rearrangement {
                let donors: Vec<&Container> = preferred.iter().chain(&others).copied().collect();
                if let Some(done) =
                    self.rearrange_for(item, &donors, containers, catalog, &exclude, &mut cache, cancel)
                {
                    log::debug!(
                        "item '{}' placed in '{}' after moving {} item(s)",
                        item.id,
                        done.container_id,
                        done.steps.len()
                    );
                    outcome
                        .placements
                        .push(record(item, &done.container_id, &done.candidate, true));
                    outcome.rearrangements.extend(done.steps);
                    cache.commit(done.states);
                    continue;
                }
            }

            log::debug!("no space for item '{}'", item.id);
            outcome.unplaced.push(unplaced(item, UnplacedReason::NoSpace));
        }

        refresh_flags(&mut outcome, &cache);
        log::info!(
            "placed {} item(s), moved {}, {} unplaced",
            outcome.placements.len(),
            outcome.rearrangements.len(),
            outcome.unplaced.len()
        );
        outcome
    }

    /// Best direct placement among `containers`, ties going to the first.
    fn best_in<'c, C: Catalog + ?Sized>(
        &self,
        item: &Item,
        containers: &[&'c Container],
        catalog: &C,
        exclude: &HashSet<&str>,
        cache: &mut GridCache,
        cancel: Option<&AtomicBool>,
    ) -> Option<(&'c Container, Candidate)> {
        let mut best: Option<(&'c Container, Candidate)> = None;
        for &container in containers {
            let state = cache.state(container, catalog, exclude);
            if self.config.enforce_weight_limit && !state.can_carry(container, item.mass) {
                continue;
            }
            let Some(candidate) = best_position(item, container, state, &self.config, cancel) else {
                continue;
            };
            if best.is_none_or(|(_, b)| candidate.score > b.score) {
                best = Some((container, candidate));
            }
        }
        best
    }

    /// Clears a slot for `item` in one of `donors` by moving lower-priority
    /// items that were stowed before the run. Every displaced item must find
    /// a new position, otherwise the slot is abandoned.
    #[allow(clippy::too_many_arguments)]
    fn rearrange_for<C: Catalog + ?Sized>(
        &self,
        item: &Item,
        donors: &[&Container],
        containers: &[Container],
        catalog: &C,
        exclude: &HashSet<&str>,
        cache: &mut GridCache,
        cancel: Option<&AtomicBool>,
    ) -> Option<Rearranged> {
        for container in containers {
            cache.state(container, catalog, exclude);
        }
        let cache = &*cache;

        for &donor in donors {
            let state = cache.get(&donor.id)?;
            let slots = plan_displacement(item, donor, &state.occupants, &self.config.rearrangement);
            for slot in slots.into_iter().take(self.config.rearrangement_attempts) {
                if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                    return None;
                }

                let mut states: HashMap<String, ContainerState> = HashMap::new();
                let mut target = state.clone();
                let ids: Vec<&str> = slot
                    .displaced
                    .iter()
                    .map(|&i| state.occupants[i].item_id.as_str())
                    .collect();
                let mut displaced = target.remove(&ids);
                displaced.sort_by(|a, b| a.bounds.origin.z.total_cmp(&b.bounds.origin.z));
                if self.config.enforce_weight_limit && !target.can_carry(donor, item.mass) {
                    continue;
                }
                target.add(Occupant {
                    item_id: item.id.clone(),
                    bounds: slot.bounds,
                    orientation: slot.orientation,
                    priority: item.priority,
                    mass: item.mass,
                    movable: false,
                });
                states.insert(donor.id.clone(), target);

                let mut steps = Vec::with_capacity(displaced.len());
                let relocated = displaced.iter().all(|occupant| {
                    let Some(moved) = catalog.item(&occupant.item_id) else {
                        return false;
                    };
                    let Some((dest, candidate)) =
                        self.relocate(moved, containers, cache, &states, cancel)
                    else {
                        return false;
                    };
                    let dest_state = states
                        .entry(dest.id.clone())
                        .or_insert_with(|| cache.get(&dest.id).cloned().unwrap_or_else(|| {
                            ContainerState::from_catalog(dest, catalog, exclude, self.config.resolution)
                        }));
                    dest_state.add(Occupant {
                        item_id: moved.id.clone(),
                        bounds: candidate.bounds,
                        orientation: candidate.orientation,
                        priority: moved.priority,
                        mass: moved.mass,
                        movable: false,
                    });
                    steps.push(MoveStep {
                        item_id: moved.id.clone(),
                        from_container: donor.id.clone(),
                        from: occupant.bounds,
                        to: Some(Destination {
                            container_id: dest.id.clone(),
                            bounds: candidate.bounds,
                            orientation: candidate.orientation,
                            visible: false,
                        }),
                    });
                    true
                });

                if relocated {
                    let score = PlacementScorer::new(item, donor, self.config.weights).score(&slot.bounds);
                    return Some(Rearranged {
                        container_id: donor.id.clone(),
                        candidate: Candidate {
                            bounds: slot.bounds,
                            orientation: slot.orientation,
                            score,
                        },
                        steps,
                        states,
                    });
                }
            }
        }
        None
    }

    /// New home for a displaced item, reading pending states first.
    fn relocate<'c>(
        &self,
        item: &Item,
        containers: &'c [Container],
        cache: &GridCache,
        pending: &HashMap<String, ContainerState>,
        cancel: Option<&AtomicBool>,
    ) -> Option<(&'c Container, Candidate)> {
        let in_zone = |c: &Container| item.preferred_zone.as_deref() == Some(c.zone.as_str());
        let mut best: Option<(&'c Container, Candidate)> = None;
        for preferred_pass in [true, false] {
            for container in containers.iter().filter(|&c| in_zone(c) == preferred_pass) {
                if !item.fits_in(&container.dimensions) {
                    continue;
                }
                let Some(state) = pending.get(&container.id).or_else(|| cache.get(&container.id)) else {
                    continue;
                };
                if self.config.enforce_weight_limit && !state.can_carry(container, item.mass) {
                    continue;
                }
                if let Some(candidate) = best_position(item, container, state, &self.config, cancel) {
                    if best.is_none_or(|(_, b)| candidate.score > b.score) {
                        best = Some((container, candidate));
                    }
                }
            }
            if best.is_some() {
                break;
            }
        }
        best
    }
}

/// Places `items` with the default configuration.
pub fn place<C: Catalog + ?Sized>(items: &[Item], containers: &[Container], catalog: &C) -> PlacementOutcome {
    PlacementEngine {
        config: PlacementConfig::default(),
    }
    .place(items, containers, catalog)
}

fn unplaced(item: &Item, reason: UnplacedReason) -> Unplaced {
    Unplaced {
        item_id: item.id.clone(),
        reason,
    }
}

fn record(item: &Item, container_id: &str, candidate: &Candidate, via_rearrangement: bool) -> PlacementRecord {
    PlacementRecord {
        item_id: item.id.clone(),
        container_id: container_id.to_string(),
        start: candidate.bounds.origin,
        end: candidate.bounds.max(),
        orientation: candidate.orientation,
        visible: false,
        score: candidate.score,
        via_rearrangement,
    }
}

fn commit<C: Catalog + ?Sized>(
    cache: &mut GridCache,
    container: &Container,
    catalog: &C,
    exclude: &HashSet<&str>,
    item: &Item,
    candidate: &Candidate,
) {
    cache.state(container, catalog, exclude).add(Occupant {
        item_id: item.id.clone(),
        bounds: candidate.bounds,
        orientation: candidate.orientation,
        priority: item.priority,
        mass: item.mass,
        movable: false,
    });
}

/// Sets the visible flag of every placement and destination against the
/// final state of its container.
fn refresh_flags(outcome: &mut PlacementOutcome, cache: &GridCache) {
    let visible_in = |container_id: &str, item_id: &str| {
        cache.get(container_id).is_some_and(|state| {
            let Some(target) = state.occupants.iter().find(|o| o.item_id == item_id) else {
                return false;
            };
            is_visible(
                &target.bounds,
                state
                    .occupants
                    .iter()
                    .filter(|o| o.item_id != item_id)
                    .map(|o| &o.bounds),
            )
        })
    };
    for record in &mut outcome.placements {
        record.visible = visible_in(&record.container_id, &record.item_id);
    }
    for step in &mut outcome.rearrangements {
        if let Some(to) = step.to.as_mut() {
            to.visible = visible_in(&to.container_id, &step.item_id);
        }
    }
}
