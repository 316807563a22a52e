//! Cargo stowage planning for containerized storage.
//!
//! Decides where items go inside containers, how to make room when they
//! do not fit, and which items have to move before a buried item can be
//! taken out:
//!
//! - **Geometry**: axis-aligned collision tests, occupancy grids and
//!   accessibility scoring. Pure functions, no state.
//! - **Placement**: greedy multi-orientation 3D packing with a scored,
//!   pruned position search and a rearrangement-backed fallback.
//! - **Rearrangement**: simulated annealing over subsets of movable items,
//!   plus a deterministic free-space analysis.
//! - **Retrieval**: blocking graph, transitive blocker set and the
//!   remove / set aside / retrieve / place back step sequence.
//! - **Returns**: waste identification and greedy selection of waste
//!   items for a return shipment under weight and volume caps.
//!
//! # Architecture
//!
//! Every planner works on an immutable snapshot read through
//! [`model::Catalog`] and returns plain result values. Nothing is shared
//! between calls: the occupancy-grid cache of a placement run lives only
//! as long as that run, and randomness comes from an explicit seed.
//! Applying a result is the job of a [`model::PlacementSink`].

pub mod anneal;
pub mod error;
pub mod geometry;
pub mod model;
pub mod placement;
pub mod random;
pub mod rearrangement;
pub mod retrieval;
pub mod returns;

pub use error::{Error, Result};
