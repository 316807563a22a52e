//! Retrieval planning.
//!
//! Items leave a container only through its open face (`z = 0`). An item
//! that some closer item shadows is reached by removing every transitive
//! blocker, retrieving the target and putting the blockers back in
//! reverse order.

mod graph;
mod planner;
mod types;
mod visibility;

pub use graph::BlockingGraph;
pub use planner::{plan_from_graph, plan_many, plan_retrieval, plan_retrieval_in, RetrievalRequest};
pub use types::{BlockerOrdering, RetrievalPlan, RetrievalStep};
pub use visibility::{is_visible, refresh_visibility, visibility_flags};
