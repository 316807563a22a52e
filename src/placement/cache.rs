//! Per-run container state.
//!
//! A [`GridCache`] lives for exactly one placement run. Each container's
//! grid is rasterized once from the catalog and then updated in place as
//! items are accepted, so later items see earlier decisions without a
//! rebuild.

use std::collections::{HashMap, HashSet};

use crate::geometry::{GridResolution, OccupancyGrid};
use crate::model::{resolve_positions, Catalog, Container};
use crate::rearrangement::Occupant;

/// Occupancy, occupants and carried mass of one container.
#[derive(Debug, Clone)]
pub struct ContainerState {
    pub grid: OccupancyGrid,
    pub occupants: Vec<Occupant>,
    pub mass: f64,
}

impl ContainerState {
    /// Rasterizes the catalog positions of `container`, ignoring items
    /// listed in `exclude`. Catalog occupants are marked movable.
    pub fn from_catalog<C: Catalog + ?Sized>(
        container: &Container,
        catalog: &C,
        exclude: &HashSet<&str>,
        resolution: GridResolution,
    ) -> Self {
        let positions = catalog
            .positions_in(&container.id)
            .into_iter()
            .filter(|p| !exclude.contains(p.item_id.as_str()));
        let occupants: Vec<Occupant> = resolve_positions(positions, catalog)
            .into_iter()
            .map(|p| Occupant {
                item_id: p.item.id.clone(),
                bounds: p.bounds,
                orientation: p.position.orientation,
                priority: p.item.priority,
                mass: p.item.mass,
                movable: true,
            })
            .collect();

        let extent = container.dimensions;
        let grid = OccupancyGrid::from_boxes(
            extent,
            resolution.cell_size(&extent),
            occupants.iter().map(|o| &o.bounds),
        );
        let mass = occupants.iter().map(|o| o.mass).sum();
        Self {
            grid,
            occupants,
            mass,
        }
    }

    /// True if adding `mass` keeps the container within its weight limit.
    pub fn can_carry(&self, container: &Container, mass: f64) -> bool {
        container
            .max_weight
            .is_none_or(|limit| self.mass + mass <= limit)
    }

    pub fn add(&mut self, occupant: Occupant) {
        self.grid.occupy(&occupant.bounds);
        self.mass += occupant.mass;
        self.occupants.push(occupant);
    }

    /// Removes the named occupants and re-rasterizes the grid.
    pub fn remove(&mut self, ids: &[&str]) -> Vec<Occupant> {
        let (removed, kept): (Vec<Occupant>, Vec<Occupant>) = std::mem::take(&mut self.occupants)
            .into_iter()
            .partition(|o| ids.contains(&o.item_id.as_str()));
        self.occupants = kept;
        self.mass -= removed.iter().map(|o| o.mass).sum::<f64>();
        self.grid = OccupancyGrid::from_boxes(
            self.grid.extent(),
            self.grid.cell_size(),
            self.occupants.iter().map(|o| &o.bounds),
        );
        removed
    }
}

/// Container states for one placement run, keyed by container id.
#[derive(Debug, Clone)]
pub struct GridCache {
    resolution: GridResolution,
    states: HashMap<String, ContainerState>,
}

impl GridCache {
    pub fn new(resolution: GridResolution) -> Self {
        Self {
            resolution,
            states: HashMap::new(),
        }
    }

    /// Returns the state of `container`, building it on first use.
    pub fn state<C: Catalog + ?Sized>(
        &mut self,
        container: &Container,
        catalog: &C,
        exclude: &HashSet<&str>,
    ) -> &mut ContainerState {
        let resolution = self.resolution;
        self.states
            .entry(container.id.clone())
            .or_insert_with(|| ContainerState::from_catalog(container, catalog, exclude, resolution))
    }

    pub fn get(&self, container_id: &str) -> Option<&ContainerState> {
        self.states.get(container_id)
    }

    /// Replaces the states of several containers at once.
    pub fn commit(&mut self, states: HashMap<String, ContainerState>) {
        self.states.extend(states);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, Vec3};
    use crate::model::{Item, Position, Snapshot};

    fn snapshot() -> Snapshot {
        let mut snap = Snapshot::new();
        snap.add_container(Container::new("A", "Z", 20.0, 20.0, 20.0).with_max_weight(10.0));
        snap.add_item(Item::new("a", 10.0, 10.0, 10.0).with_mass(4.0));
        snap.add_item(Item::new("b", 5.0, 5.0, 5.0).with_mass(2.0));
        snap.add_position(Position::new("a", "A", Vec3::ZERO, 0));
        snap.add_position(Position::new("b", "A", Vec3::new(10.0, 0.0, 0.0), 0));
        snap
    }

    #[test]
    fn test_builds_once_and_tracks_mass() {
        let snap = snapshot();
        let container = snap.container("A").unwrap().clone();
        let mut cache = GridCache::new(GridResolution::default());
        let state = cache.state(&container, &snap, &HashSet::new());
        assert_eq!(state.occupants.len(), 2);
        assert_eq!(state.mass, 6.0);
        assert!(state.can_carry(&container, 4.0));
        assert!(!state.can_carry(&container, 4.5));

        state.add(Occupant {
            item_id: "c".into(),
            bounds: Aabb::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(5.0, 5.0, 5.0)),
            orientation: 0,
            priority: 50,
            mass: 1.0,
            movable: false,
        });
        assert_eq!(cache.len(), 1);
        let state = cache.get("A").unwrap();
        assert_eq!(state.occupants.len(), 3);
        assert!(!state.grid.is_free(&Aabb::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 1.0, 1.0))));
    }

    #[test]
    fn test_excluded_items_are_ignored() {
        let snap = snapshot();
        let container = snap.container("A").unwrap().clone();
        let exclude: HashSet<&str> = ["a"].into_iter().collect();
        let state = ContainerState::from_catalog(&container, &snap, &exclude, GridResolution::default());
        assert_eq!(state.occupants.len(), 1);
        assert!(state.grid.is_free(&Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0))));
    }

    #[test]
    fn test_remove_frees_cells() {
        let snap = snapshot();
        let container = snap.container("A").unwrap().clone();
        let mut state = ContainerState::from_catalog(&container, &snap, &HashSet::new(), GridResolution::default());
        let removed = state.remove(&["a"]);
        assert_eq!(removed.len(), 1);
        assert_eq!(state.mass, 2.0);
        assert!(state.grid.is_free(&Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0))));
    }
}
