//! Snapshot lookup and persistence seams.
//!
//! Planners read entity snapshots through [`Catalog`] and hand accepted
//! results to a [`PlacementSink`]. [`Snapshot`] implements both in memory.

use std::collections::BTreeMap;

use super::container::Container;
use super::item::Item;
use super::position::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read access to items, containers and current positions.
pub trait Catalog {
    /// Looks up an item by id.
    fn item(&self, id: &str) -> Option<&Item>;

    /// Looks up a container by id.
    fn container(&self, id: &str) -> Option<&Container>;

    /// Current positions inside a container, in a stable order.
    fn positions_in(&self, container_id: &str) -> Vec<&Position>;

    /// Current position of an item, if it is stowed.
    fn position_of(&self, item_id: &str) -> Option<&Position>;
}

/// Kind of change recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuditAction {
    /// A new item was stowed.
    Placement,
    /// A stowed item changed container or position.
    Move,
    /// An item was taken out for use.
    Retrieval,
    /// A waste item left with an undocking container.
    Disposal,
}

/// One audit log line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Item the entry is about.
    pub item_id: String,
    /// Free-form human-readable description.
    pub detail: String,
}

impl AuditEntry {
    pub fn new(action: AuditAction, item_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            action,
            item_id: item_id.into(),
            detail: detail.into(),
        }
    }
}

/// Write access for accepted plans.
pub trait PlacementSink {
    /// Stores a position, superseding any previous position of the item.
    fn persist_position(&mut self, position: Position);

    /// Removes and returns the current position of an item.
    fn remove_position(&mut self, item_id: &str) -> Option<Position>;

    /// Appends an entry to the audit log.
    fn append_audit(&mut self, entry: AuditEntry);
}

/// In-memory catalog and sink.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    items: BTreeMap<String, Item>,
    containers: BTreeMap<String, Container>,
    positions: BTreeMap<String, Position>,
    audit: Vec<AuditEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an item.
    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// Inserts or replaces a container.
    pub fn add_container(&mut self, container: Container) {
        self.containers.insert(container.id.clone(), container);
    }

    /// Stores a position. Any previous position of the same item is
    /// superseded. The item does not need to exist in the snapshot.
    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.item_id.clone(), position);
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit
    }
}

impl Catalog for Snapshot {
    fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    fn container(&self, id: &str) -> Option<&Container> {
        self.containers.get(id)
    }

    fn positions_in(&self, container_id: &str) -> Vec<&Position> {
        self.positions
            .values()
            .filter(|p| p.container_id == container_id)
            .collect()
    }

    fn position_of(&self, item_id: &str) -> Option<&Position> {
        self.positions.get(item_id)
    }
}

impl PlacementSink for Snapshot {
    fn persist_position(&mut self, position: Position) {
        self.add_position(position);
    }

    fn remove_position(&mut self, item_id: &str) -> Option<Position> {
        self.positions.remove(item_id)
    }

    fn append_audit(&mut self, entry: AuditEntry) {
        self.audit.push(entry);
    }
}
