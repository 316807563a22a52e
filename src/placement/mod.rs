//! Placement engine.
//!
//! Multi-orientation 3D placement of item batches into containers over
//! per-run occupancy grids. See [`PlacementEngine`] for the item and
//! container ordering, and [`PlacementScorer`] for the score.
//!
//! # Score
//!
//! ```text
//! priority / 100
//!   + 0.5 if the container is in the item's preferred zone
//!   + 0.3 * accessibility
//!   + min(10 * item_volume / container_volume, 0.2)
//!   + 0.1 * touching_walls / 6
//! ```

mod cache;
mod config;
mod engine;
mod manual;
mod score;
mod search;
mod types;

pub use cache::{ContainerState, GridCache};
pub use config::{PlacementConfig, ScoreWeights};
pub use engine::{place, PlacementEngine};
pub use manual::validate_manual_placement;
pub use score::PlacementScorer;
pub use search::{best_position, Candidate};
pub use types::{PlacementOutcome, PlacementRecord, Unplaced, UnplacedReason};
