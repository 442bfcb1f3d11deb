//! Dependency graph between formula cells.
//!
//! Tracks, for each cell, which cells its formula reads (precedents) and
//! which cells read it (dependents). Cycle detection is a reachability
//! check performed *before* edges are committed; it is fully decoupled
//! from numeric evaluation, so legitimate NaN results (e.g. `0/0`) are
//! never mistaken for circular references.
//!
//! Invariants maintained by this module:
//! - edge symmetry: `b ∈ precedents(a)` iff `a ∈ dependents(b)`
//! - acyclicity, provided callers only commit after `would_cycle` is false

use std::collections::{BTreeMap, BTreeSet};

use super::cell_id::CellId;

#[derive(Clone, Debug, Default)]
struct Node {
    precedents: BTreeSet<CellId>,
    dependents: BTreeSet<CellId>,
}

impl Node {
    fn is_disconnected(&self) -> bool {
        self.precedents.is_empty() && self.dependents.is_empty()
    }
}

/// Arena of per-cell edge sets, keyed by [`CellId`]. Edges are mutated
/// only through [`DepGraph::commit_edges`]; a node may exist for a cell
/// that holds no expression (an empty cell other cells reference).
#[derive(Clone, Debug, Default)]
pub struct DepGraph {
    nodes: BTreeMap<CellId, Node>,
}

impl DepGraph {
    pub fn new() -> DepGraph {
        DepGraph::default()
    }

    /// The cells whose formulas read `id`.
    pub fn dependents(&self, id: &CellId) -> BTreeSet<CellId> {
        self.nodes
            .get(id)
            .map(|n| n.dependents.clone())
            .unwrap_or_default()
    }

    /// The cells `id`'s formula reads.
    pub fn precedents(&self, id: &CellId) -> BTreeSet<CellId> {
        self.nodes
            .get(id)
            .map(|n| n.precedents.clone())
            .unwrap_or_default()
    }

    /// Would replacing `id`'s outgoing edges with `new_precedents` create
    /// a cycle? True iff `id` is reachable from any member of
    /// `new_precedents` along existing precedent edges. A self-reference
    /// is always a cycle.
    pub fn would_cycle(&self, id: &CellId, new_precedents: &BTreeSet<CellId>) -> bool {
        if new_precedents.contains(id) {
            return true;
        }

        let mut visited: BTreeSet<&CellId> = BTreeSet::new();
        let mut stack: Vec<&CellId> = new_precedents.iter().collect();
        while let Some(current) = stack.pop() {
            if current == id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.precedents.iter());
            }
        }
        false
    }

    /// Replace `id`'s outgoing edges with `new_precedents`, keeping the
    /// reverse (dependents) sets symmetric. Must only be called after
    /// [`DepGraph::would_cycle`] returned false for the same arguments.
    /// Nodes that become fully disconnected are dropped.
    pub fn commit_edges(&mut self, id: &CellId, new_precedents: BTreeSet<CellId>) {
        let old_precedents = self.precedents(id);
        for p in &old_precedents {
            if let Some(node) = self.nodes.get_mut(p) {
                node.dependents.remove(id);
                if node.is_disconnected() {
                    self.nodes.remove(p);
                }
            }
        }

        for p in &new_precedents {
            self.nodes
                .entry(p.clone())
                .or_default()
                .dependents
                .insert(id.clone());
        }

        let node = self.nodes.entry(id.clone()).or_default();
        node.precedents = new_precedents;
        if node.is_disconnected() {
            self.nodes.remove(id);
        }
    }

    /// All cells transitively reachable from `id` along dependent edges
    /// (excluding `id` itself), in topological order: a cell appears only
    /// after every one of its precedents in the result set, so cascade
    /// recomputation in this order never reads a stale value. Ties between
    /// independent cells break by `CellId` order for reproducibility.
    pub fn transitive_dependents(&self, id: &CellId) -> Vec<CellId> {
        let mut members: BTreeSet<CellId> = BTreeSet::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                for d in &node.dependents {
                    if members.insert(d.clone()) {
                        stack.push(d.clone());
                    }
                }
            }
        }
        members.remove(id);

        // Kahn's algorithm restricted to the reachable subgraph. Edges
        // from cells outside the set (including `id`, already recomputed)
        // are considered satisfied.
        let mut pending: BTreeMap<CellId, usize> = BTreeMap::new();
        let mut ready: BTreeSet<CellId> = BTreeSet::new();
        for cell in &members {
            let in_degree = self
                .precedents(cell)
                .iter()
                .filter(|p| members.contains(*p))
                .count();
            if in_degree == 0 {
                ready.insert(cell.clone());
            } else {
                pending.insert(cell.clone(), in_degree);
            }
        }

        let mut order = Vec::with_capacity(members.len());
        while let Some(next) = ready.iter().next().cloned() {
            ready.remove(&next);
            for d in self.dependents(&next) {
                let mut now_ready = false;
                if let Some(deg) = pending.get_mut(&d) {
                    *deg -= 1;
                    now_ready = *deg == 0;
                }
                if now_ready {
                    pending.remove(&d);
                    ready.insert(d);
                }
            }
            order.push(next);
        }
        order
    }

    /// Drop every edge in the graph.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
