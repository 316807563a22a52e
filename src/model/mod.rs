//! Entity snapshots: items, containers and positions.
//!
//! All coordinates are container-local with `z = 0` at the open face.

mod catalog;
mod container;
mod item;
mod position;

pub use catalog::{AuditAction, AuditEntry, Catalog, PlacementSink, Snapshot};
pub use container::{Container, OpenFace};
pub use item::{Day, Item, ItemStatus, Orientation, WasteReason};
pub use position::{resolve_positions, Placed, Position};
