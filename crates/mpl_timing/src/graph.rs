//! Timing graph data structures.
//!
//! The [`TimingGraph`] is a directed graph of vertices bound to instance
//! pins or chip-boundary terminals, with edges along combinational signal
//! flow. It is supplied by the surrounding timing analyzer; the placer only
//! reads it. Sequential elements appear as D-input / Q-output vertex pairs
//! on the same instance so connectivity can be traced across register
//! boundaries.

use crate::ids::{EdgeId, VertexId};
use mpl_db::{InstId, PortDirection, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a timing vertex is bound to in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinRef {
    /// A named pin on a database instance.
    InstPin {
        /// The owning instance.
        inst: InstId,
        /// The pin name (e.g., "Q", "D", "A[3]").
        pin: String,
    },
    /// A chip-boundary terminal.
    Term(TermId),
}

/// The functional classification of a timing vertex.
///
/// Determines how the fanin propagation treats the vertex: sequential
/// inputs absorb fanin but do not propagate it; sequential outputs start
/// new fanin frontiers after the register copy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    /// A combinational pin; fanin propagates straight through.
    Combinational,
    /// A sequential element's data input (register D pin).
    SequentialInput,
    /// A sequential element's data output (register Q pin).
    SequentialOutput,
}

/// A vertex in the timing graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// The unique ID of this vertex.
    pub id: VertexId,
    /// The pin or terminal this vertex is bound to.
    pub pin: PinRef,
    /// The signal direction of the pin, seen from its owner.
    pub dir: PortDirection,
    /// The functional classification of this vertex.
    pub kind: VertexKind,
}

/// A directed edge along combinational signal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The unique ID of this edge.
    pub id: EdgeId,
    /// The source vertex.
    pub from: VertexId,
    /// The destination vertex.
    pub to: VertexId,
}

/// The timing graph consumed by the adjacency-weighting engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingGraph {
    /// All vertices in the graph.
    pub vertices: Vec<Vertex>,
    /// All directed edges in the graph.
    pub edges: Vec<Edge>,
    /// Whether liberty timing views are available. When `false` the
    /// sequential classification of vertices is not trustworthy and the
    /// weighting engine must fall back to direct-connection mode.
    pub liberty_loaded: bool,
    /// Auxiliary index: pin to vertex (rebuilt on deserialization).
    #[serde(skip)]
    vertex_by_pin: HashMap<PinRef, VertexId>,
    /// Auxiliary index: outgoing edges per vertex.
    #[serde(skip)]
    out_edges: Vec<Vec<EdgeId>>,
    /// Auxiliary index: incoming edges per vertex.
    #[serde(skip)]
    in_edges: Vec<Vec<EdgeId>>,
}

impl TimingGraph {
    /// Creates an empty timing graph with liberty data available.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            liberty_loaded: true,
            vertex_by_pin: HashMap::new(),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Creates an empty timing graph with liberty data marked missing.
    pub fn without_liberty() -> Self {
        let mut g = Self::new();
        g.liberty_loaded = false;
        g
    }

    /// Adds a vertex and returns its ID.
    pub fn add_vertex(&mut self, pin: PinRef, dir: PortDirection, kind: VertexKind) -> VertexId {
        let id = VertexId::from_raw(self.vertices.len() as u32);
        self.vertex_by_pin.insert(pin.clone(), id);
        self.vertices.push(Vertex { id, pin, dir, kind });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        id
    }

    /// Adds a directed edge and returns its ID.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> EdgeId {
        let id = EdgeId::from_raw(self.edges.len() as u32);
        self.edges.push(Edge { id, from, to });
        self.out_edges[from.as_raw() as usize].push(id);
        self.in_edges[to.as_raw() as usize].push(id);
        id
    }

    /// Returns the vertex with the given ID.
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.as_raw() as usize]
    }

    /// Returns the edge with the given ID.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.as_raw() as usize]
    }

    /// Returns the vertex bound to the given pin, if any.
    pub fn vertex_for_pin(&self, pin: &PinRef) -> Option<VertexId> {
        self.vertex_by_pin.get(pin).copied()
    }

    /// Returns the predecessor vertices of `v`.
    pub fn preds(&self, v: VertexId) -> Vec<VertexId> {
        self.in_edges[v.as_raw() as usize]
            .iter()
            .map(|&e| self.edge(e).from)
            .collect()
    }

    /// Returns the successor vertices of `v`.
    pub fn succs(&self, v: VertexId) -> Vec<VertexId> {
        self.out_edges[v.as_raw() as usize]
            .iter()
            .map(|&e| self.edge(e).to)
            .collect()
    }

    /// Returns the number of predecessors of `v` without allocating.
    pub fn pred_count(&self, v: VertexId) -> usize {
        self.in_edges[v.as_raw() as usize].len()
    }

    /// Returns the total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the sequential output vertex paired with the given
    /// sequential input vertex, i.e. the Q pin of the register whose D pin
    /// is `v`. Returns `None` if `v` is not a sequential input, is not
    /// bound to an instance pin, or the instance has no sequential output.
    pub fn seq_out_vertex(&self, v: VertexId) -> Option<VertexId> {
        let vertex = self.vertex(v);
        if vertex.kind != VertexKind::SequentialInput {
            return None;
        }
        let inst = match &vertex.pin {
            PinRef::InstPin { inst, .. } => *inst,
            PinRef::Term(_) => return None,
        };
        self.vertices
            .iter()
            .find(|u| {
                u.kind == VertexKind::SequentialOutput
                    && matches!(&u.pin, PinRef::InstPin { inst: i, .. } if *i == inst)
            })
            .map(|u| u.id)
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.vertex_by_pin.clear();
        for v in &self.vertices {
            self.vertex_by_pin.insert(v.pin.clone(), v.id);
        }
        self.out_edges = vec![Vec::new(); self.vertices.len()];
        self.in_edges = vec![Vec::new(); self.vertices.len()];
        for e in &self.edges {
            self.out_edges[e.from.as_raw() as usize].push(e.id);
            self.in_edges[e.to.as_raw() as usize].push(e.id);
        }
    }
}

impl Default for TimingGraph {
    fn default() -> Self {
        Self::new()
    }
}
