//! Levelized forward-BFS order over the timing graph.
//!
//! The fanin propagation pass needs a strict ordering guarantee: a vertex
//! may only be visited once all of its predecessors have been processed,
//! because its fanin set is the union of its predecessors' sets. This
//! module computes that order once (Kahn's algorithm) so the pass is a
//! single linear sweep.

use crate::graph::TimingGraph;
use crate::ids::VertexId;
use std::collections::VecDeque;

/// A precomputed topological visitation order over a [`TimingGraph`].
///
/// Vertices with no predecessors come first; every other vertex appears
/// after all of its predecessors. If the graph contains a cycle (which a
/// well-formed combinational graph never does), the vertices on the cycle
/// are appended in ID order so the order stays total and deterministic.
#[derive(Debug, Clone)]
pub struct TopoOrder {
    order: Vec<VertexId>,
}

impl TopoOrder {
    /// Computes the topological order for the given graph.
    pub fn new(graph: &TimingGraph) -> Self {
        let n = graph.vertex_count();
        let mut in_degree: Vec<usize> = (0..n)
            .map(|i| graph.pred_count(VertexId::from_raw(i as u32)))
            .collect();

        let mut queue: VecDeque<VertexId> = (0..n)
            .map(|i| VertexId::from_raw(i as u32))
            .filter(|v| in_degree[v.as_raw() as usize] == 0)
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for s in graph.succs(v) {
                let d = &mut in_degree[s.as_raw() as usize];
                *d -= 1;
                if *d == 0 {
                    queue.push_back(s);
                }
            }
        }

        // Cycle remnants: append in ID order so the order is still total.
        if order.len() < n {
            let seen: std::collections::HashSet<VertexId> = order.iter().copied().collect();
            for i in 0..n {
                let v = VertexId::from_raw(i as u32);
                if !seen.contains(&v) {
                    order.push(v);
                }
            }
        }

        Self { order }
    }

    /// Returns the vertices in visitation order.
    pub fn order(&self) -> &[VertexId] {
        &self.order
    }

    /// Returns an iterator over the vertices in visitation order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.order.iter().copied()
    }

    /// Returns the number of ordered vertices.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
