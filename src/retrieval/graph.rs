//! Blocking graph over the items of one container.
//!
//! An edge `A -> B` means A sits strictly in front of B (lower `z` origin)
//! and their footprints overlap, so A must move before B can leave through
//! the open face.

use std::collections::{HashMap, VecDeque};

use crate::geometry::Aabb;
use crate::model::Placed;

/// Directed blocking graph stored as adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct BlockingGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    /// Sort key per node: front depth of the box (0 for graphs built from
    /// explicit edges).
    depth: Vec<f64>,
    blocks: Vec<Vec<usize>>,
    blocked_by: Vec<Vec<usize>>,
}

impl BlockingGraph {
    /// Builds the graph from resolved placements.
    ///
    /// Nodes are sorted by `z` so each item is only tested against items
    /// strictly further back; peers at the same depth are skipped with a
    /// binary search.
    pub fn build(placed: &[Placed<'_>]) -> Self {
        let mut order: Vec<(&str, Aabb)> = placed
            .iter()
            .map(|p| (p.item.id.as_str(), p.bounds))
            .collect();
        order.sort_by(|a, b| {
            a.1.origin
                .z
                .total_cmp(&b.1.origin.z)
                .then_with(|| a.0.cmp(b.0))
        });

        let mut graph = Self::default();
        for (id, bounds) in &order {
            graph.add_node(id, bounds.origin.z);
        }
        for (i, (_, front)) in order.iter().enumerate() {
            let first_behind =
                i + 1 + order[i + 1..].partition_point(|(_, b)| b.origin.z <= front.origin.z);
            for (j, (_, back)) in order.iter().enumerate().skip(first_behind) {
                if front.overlaps_xy(back) {
                    graph.add_edge(i, j);
                }
            }
        }
        graph
    }

    /// Builds a graph from explicit `(blocker, blocked)` id pairs.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut graph = Self::default();
        for (from, to) in edges {
            let a = graph.add_node(from, 0.0);
            let b = graph.add_node(to, 0.0);
            graph.add_edge(a, b);
        }
        graph
    }

    fn add_node(&mut self, id: &str, depth: f64) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        self.depth.push(depth);
        self.blocks.push(Vec::new());
        self.blocked_by.push(Vec::new());
        idx
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.blocks[from].contains(&to) {
            self.blocks[from].push(to);
            self.blocked_by[to].push(from);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    /// True if `from` directly blocks `to`.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.blocks[a].contains(&b),
            _ => false,
        }
    }

    /// Every node with a path to `target`, i.e. its transitive blockers,
    /// in breadth-first discovery order.
    pub fn blockers_of(&self, target: &str) -> Vec<String> {
        self.blocker_indices(target)
            .into_iter()
            .map(|i| self.ids[i].clone())
            .collect()
    }

    fn blocker_indices(&self, target: &str) -> Vec<usize> {
        let Some(&start) = self.index.get(target) else {
            return Vec::new();
        };
        let mut seen = vec![false; self.len()];
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut found = Vec::new();
        while let Some(node) = queue.pop_front() {
            for &pred in &self.blocked_by[node] {
                if !seen[pred] {
                    seen[pred] = true;
                    found.push(pred);
                    queue.push_back(pred);
                }
            }
        }
        found
    }

    /// Kahn's algorithm on the subgraph induced by `nodes`.
    ///
    /// Returns `None` if the subgraph has a cycle. Ties are broken by node
    /// index, which follows depth for graphs built from placements.
    fn topological_order(&self, nodes: &[usize]) -> Option<Vec<usize>> {
        let mut member = vec![false; self.len()];
        for &n in nodes {
            member[n] = true;
        }
        let mut in_degree = vec![0usize; self.len()];
        for &n in nodes {
            in_degree[n] = self.blocked_by[n].iter().filter(|&&p| member[p]).count();
        }

        let mut sorted_nodes = nodes.to_vec();
        sorted_nodes.sort_unstable();
        let mut queue: VecDeque<usize> = sorted_nodes
            .iter()
            .copied()
            .filter(|&n| in_degree[n] == 0)
            .collect();

        let mut order = Vec::with_capacity(nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            let mut next: Vec<usize> = self.blocks[node]
                .iter()
                .copied()
                .filter(|&s| member[s])
                .collect();
            next.sort_unstable();
            for succ in next {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(succ);
                }
            }
        }

        (order.len() == nodes.len()).then_some(order)
    }

    /// Transitive blockers of `target` in removal order.
    ///
    /// The order is the reversed topological order of the blocking
    /// subgraph, so an item is removed only after everything it blocks
    /// within that subgraph. Returns `(order, true)` on success and
    /// `(front_to_back, false)` if the subgraph is cyclic.
    pub fn removal_order(&self, target: &str) -> (Vec<String>, bool) {
        let blockers = self.blocker_indices(target);
        match self.topological_order(&blockers) {
            Some(mut order) => {
                order.reverse();
                (order.into_iter().map(|i| self.ids[i].clone()).collect(), true)
            }
            None => {
                log::warn!(
                    "blocking graph around '{target}' has a cycle; falling back to depth order"
                );
                let mut order = blockers;
                order.sort_by(|&a, &b| {
                    self.depth[a]
                        .total_cmp(&self.depth[b])
                        .then_with(|| self.ids[a].cmp(&self.ids[b]))
                });
                (order.into_iter().map(|i| self.ids[i].clone()).collect(), false)
            }
        }
    }
}
