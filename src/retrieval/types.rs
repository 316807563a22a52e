//! Retrieval steps and plans.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One physical action of a retrieval sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "action", content = "item_id", rename_all = "camelCase")
)]
pub enum RetrievalStep {
    /// Take a blocking item out of the container.
    Remove(String),
    /// Put a removed item somewhere outside the container.
    SetAside(String),
    /// Take the target out.
    Retrieve(String),
    /// Return a blocking item to its original position.
    PlaceBack(String),
}

impl RetrievalStep {
    pub fn item_id(&self) -> &str {
        match self {
            RetrievalStep::Remove(id)
            | RetrievalStep::SetAside(id)
            | RetrievalStep::Retrieve(id)
            | RetrievalStep::PlaceBack(id) => id,
        }
    }

    /// Action name as used in step lists (`remove`, `setAside`, ...).
    pub fn action(&self) -> &'static str {
        match self {
            RetrievalStep::Remove(_) => "remove",
            RetrievalStep::SetAside(_) => "setAside",
            RetrievalStep::Retrieve(_) => "retrieve",
            RetrievalStep::PlaceBack(_) => "placeBack",
        }
    }
}

/// How the blocker order of a plan was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlockerOrdering {
    /// The target was visible; nothing had to move.
    Direct,
    /// Reversed topological order of the blocking subgraph.
    Topological,
    /// The blocking subgraph had a cycle; blockers are ordered front to
    /// back instead.
    DepthFallback,
}

/// A complete retrieval sequence for one target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetrievalPlan {
    pub target: String,
    pub container_id: String,
    /// Items to move, in removal order.
    pub blockers: Vec<String>,
    pub ordering: BlockerOrdering,
    pub steps: Vec<RetrievalStep>,
}

impl RetrievalPlan {
    /// Builds the step list for a target and its ordered blockers.
    pub(crate) fn new(
        target: &str,
        container_id: &str,
        blockers: Vec<String>,
        ordering: BlockerOrdering,
    ) -> Self {
        let mut steps = Vec::with_capacity(blockers.len() * 3 + 1);
        for id in &blockers {
            steps.push(RetrievalStep::Remove(id.clone()));
            steps.push(RetrievalStep::SetAside(id.clone()));
        }
        steps.push(RetrievalStep::Retrieve(target.to_string()));
        for id in blockers.iter().rev() {
            steps.push(RetrievalStep::PlaceBack(id.clone()));
        }
        Self {
            target: target.to_string(),
            container_id: container_id.to_string(),
            blockers,
            ordering,
            steps,
        }
    }

    /// True if the target can be taken out without moving anything.
    pub fn is_direct(&self) -> bool {
        self.blockers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_mirror_blockers() {
        let plan = RetrievalPlan::new(
            "T",
            "C",
            vec!["a".into(), "b".into()],
            BlockerOrdering::Topological,
        );
        let actions: Vec<_> = plan
            .steps
            .iter()
            .map(|s| format!("{}:{}", s.action(), s.item_id()))
            .collect();
        assert_eq!(
            actions,
            [
                "remove:a",
                "setAside:a",
                "remove:b",
                "setAside:b",
                "retrieve:T",
                "placeBack:b",
                "placeBack:a"
            ]
        );
        assert!(!plan.is_direct());
    }

    #[test]
    fn test_direct_plan() {
        let plan = RetrievalPlan::new("T", "C", Vec::new(), BlockerOrdering::Direct);
        assert_eq!(plan.steps, vec![RetrievalStep::Retrieve("T".into())]);
        assert!(plan.is_direct());
    }
}
