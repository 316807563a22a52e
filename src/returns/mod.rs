//! Waste returns.
//!
//! Waste is ranked by `priority + 2 * days_as_waste (+ 100 if expired)` and
//! taken greedily while both the weight and the volume cap hold. This is
//! a knapsack approximation, not an optimal selection. Selected items that
//! are blocked where they sit get a retrieval plan before they are moved
//! to the undocking container.

mod plan;
mod selection;
mod waste;

pub use plan::{
    complete_undocking, plan_return, ManifestEntry, ReturnManifest, ReturnMove, ReturnPlan,
    ReturnRequest, UndockingReport,
};
pub use selection::{rank_for_return, return_priority, select_within_caps, ReturnCandidate};
pub use waste::{identify_waste, WasteRecord};
