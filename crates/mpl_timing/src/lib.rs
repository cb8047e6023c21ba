//! Timing-graph interface for the mpl macro placement toolkit.
//!
//! The [`TimingGraph`] is the placer's view of the design's connectivity:
//! a directed graph whose vertices are bound to instance pins or to
//! chip-boundary terminals, with edges along combinational signal flow.
//! Vertices are classified as combinational or sequential (register D/Q),
//! and sequential D→Q pairs can be queried so the fanin propagation can
//! copy connectivity across register boundaries.
//!
//! [`TopoOrder`] provides the levelized forward-BFS order the fanin pass
//! requires: a vertex is only visited once all of its predecessors have
//! been processed.
//!
//! Liberty timing data may be absent; [`TimingGraph::liberty_loaded`]
//! reports this so the weighting engine can degrade to its non-timing
//! fallback mode.

#![warn(missing_docs)]

pub mod graph;
pub mod ids;
pub mod topo;

pub use graph::{PinRef, TimingGraph, Vertex, VertexKind};
pub use ids::{EdgeId, VertexId};
pub use topo::TopoOrder;
