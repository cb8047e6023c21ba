//! The adjacency-weighting engine.
//!
//! Derives the weighted macro-to-macro adjacency model from the timing
//! graph and the macro list. Connectivity is traced through combinational
//! logic by a fanin propagation pass in topological order: every macro
//! output pin (and every input boundary terminal) seeds a fanin set, each
//! vertex accumulates the union of its predecessors' sets, registers
//! block propagation, and a dedicated copy pass carries fanin across
//! paired D→Q register pins before propagation resumes. Each macro input
//! pin (and output boundary terminal) then contributes one weight unit
//! per macro in its driving fanin set.
//!
//! Chip-boundary terminals participate as four pseudo-macros, one per
//! [`CoreEdge`], occupying the reserved trailing indices of the weight
//! model.
//!
//! When liberty timing data is unavailable the sequential classification
//! cannot be trusted, so the engine degrades to direct driver→load
//! weighting and says so through the diagnostic sink.

use crate::layout::{nearest_edge, CoreEdge, Layout, CORE_EDGE_COUNT};
use crate::macros::Macro;
use mpl_db::{InstId, LayoutDb, PortDirection};
use mpl_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use mpl_partition::AdjacencyView;
use mpl_timing::{PinRef, TimingGraph, TopoOrder, Vertex, VertexId, VertexKind};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The set of macro (or edge pseudo-macro) indices reaching a vertex.
pub type MacroSet = BTreeSet<usize>;

/// Transient map from timing vertex to its macro fanin cone.
pub type VertexFaninMap = HashMap<VertexId, MacroSet>;

/// Sparse ordered-pair weights: (from, to) → pin-to-pin connection count.
pub type AdjWeightMap = BTreeMap<(usize, usize), u32>;

/// What a timing vertex belongs to, in weight-model terms.
enum PinOwner {
    /// A pin on one of the placeable macros.
    MacroPin { index: usize, dir: PortDirection },
    /// A chip-boundary terminal, folded into its nearest edge.
    Terminal { edge: CoreEdge, dir: PortDirection },
    /// Standard-cell logic; transparent to the weight model.
    Other,
}

fn owner(
    db: &dyn LayoutDb,
    macro_inst_map: &HashMap<InstId, usize>,
    layout: &Layout,
    vertex: &Vertex,
) -> PinOwner {
    match &vertex.pin {
        PinRef::InstPin { inst, .. } => match macro_inst_map.get(inst) {
            Some(&index) => PinOwner::MacroPin {
                index,
                dir: vertex.dir,
            },
            None => PinOwner::Other,
        },
        PinRef::Term(term) => {
            let record = db.terminal(*term);
            PinOwner::Terminal {
                edge: nearest_edge(layout, record.x, record.y),
                dir: record.direction,
            }
        }
    }
}

fn drives(dir: PortDirection) -> bool {
    matches!(dir, PortDirection::Output | PortDirection::InOut)
}

fn consumes(dir: PortDirection) -> bool {
    matches!(dir, PortDirection::Input | PortDirection::InOut)
}

/// Derives the sparse adjacency weight map.
///
/// Deterministic for identical inputs; never records a self-pair. Falls
/// back to direct-connection weighting (with a warning) when liberty data
/// is missing.
pub fn find_adjacencies(
    db: &dyn LayoutDb,
    graph: &TimingGraph,
    macros: &[Macro],
    macro_inst_map: &HashMap<InstId, usize>,
    layout: &Layout,
    sink: &DiagnosticSink,
) -> AdjWeightMap {
    if !graph.liberty_loaded {
        sink.emit(Diagnostic::warning(
            DiagnosticCode::new(Category::Timing, 1),
            "liberty timing data unavailable, weighting direct connections only",
        ));
        return direct_adjacencies(db, graph, macros, macro_inst_map, layout);
    }

    let topo = TopoOrder::new(graph);
    let mut fanins = VertexFaninMap::new();

    seed_fanin_bfs(db, graph, macros, macro_inst_map, layout, &mut fanins);
    find_fanins(graph, &topo, &mut fanins);
    if copy_fanins_across_registers(graph, &mut fanins) {
        find_fanins(graph, &topo, &mut fanins);
    }
    find_adj_weights(db, graph, macros, macro_inst_map, layout, &fanins)
}

/// Seeds the fanin frontier: macro output pins carry their macro's index,
/// input boundary terminals carry their edge's pseudo-macro index.
fn seed_fanin_bfs(
    db: &dyn LayoutDb,
    graph: &TimingGraph,
    macros: &[Macro],
    macro_inst_map: &HashMap<InstId, usize>,
    layout: &Layout,
    fanins: &mut VertexFaninMap,
) {
    let n = macros.len();
    for vertex in &graph.vertices {
        match owner(db, macro_inst_map, layout, vertex) {
            PinOwner::MacroPin { index, dir } if drives(dir) => {
                fanins.entry(vertex.id).or_default().insert(index);
            }
            // Input terminals drive into the core.
            PinOwner::Terminal { edge, dir }
                if matches!(dir, PortDirection::Input | PortDirection::InOut) =>
            {
                fanins.entry(vertex.id).or_default().insert(n + edge.index());
            }
            _ => {}
        }
    }
}

/// Forward propagation in topological order.
///
/// Each vertex accumulates the union of its predecessors' fanin sets.
/// Sequential inputs absorb fanin but never propagate it: the register
/// boundary stops the cone.
fn find_fanins(graph: &TimingGraph, topo: &TopoOrder, fanins: &mut VertexFaninMap) {
    for v in topo.iter() {
        let mut merged = MacroSet::new();
        for p in graph.preds(v) {
            if graph.vertex(p).kind == VertexKind::SequentialInput {
                continue;
            }
            if let Some(set) = fanins.get(&p) {
                merged.extend(set.iter().copied());
            }
        }
        if !merged.is_empty() {
            fanins.entry(v).or_default().extend(merged);
        }
    }
}

/// Copies each register's accumulated D-pin fanin to its paired Q pin.
///
/// Returns whether anything changed, in which case the caller re-runs the
/// propagation so the copied sets flow onward from the register outputs.
fn copy_fanins_across_registers(graph: &TimingGraph, fanins: &mut VertexFaninMap) -> bool {
    let mut changed = false;
    for vertex in &graph.vertices {
        if vertex.kind != VertexKind::SequentialInput {
            continue;
        }
        let Some(q) = graph.seq_out_vertex(vertex.id) else {
            continue;
        };
        let Some(set) = fanins.get(&vertex.id).cloned() else {
            continue;
        };
        if set.is_empty() {
            continue;
        }
        let entry = fanins.entry(q).or_default();
        let before = entry.len();
        entry.extend(set);
        changed |= entry.len() > before;
    }
    changed
}

/// Accumulates pairwise weights from the fanin map.
///
/// Every macro input pin and every output boundary terminal contributes
/// one unit per macro in the fanin set of its vertex. Self-pairs are
/// skipped.
fn find_adj_weights(
    db: &dyn LayoutDb,
    graph: &TimingGraph,
    macros: &[Macro],
    macro_inst_map: &HashMap<InstId, usize>,
    layout: &Layout,
    fanins: &VertexFaninMap,
) -> AdjWeightMap {
    let n = macros.len();
    let mut adj = AdjWeightMap::new();
    for vertex in &graph.vertices {
        let consumer = match owner(db, macro_inst_map, layout, vertex) {
            PinOwner::MacroPin { index, dir } if consumes(dir) => index,
            PinOwner::Terminal { edge, dir }
                if matches!(dir, PortDirection::Output | PortDirection::InOut) =>
            {
                n + edge.index()
            }
            _ => continue,
        };
        let Some(set) = fanins.get(&vertex.id) else {
            continue;
        };
        for &from in set {
            if from != consumer {
                *adj.entry((from, consumer)).or_insert(0) += 1;
            }
        }
    }
    adj
}

/// Non-timing fallback: weight 1 per direct driver→load connection.
fn direct_adjacencies(
    db: &dyn LayoutDb,
    graph: &TimingGraph,
    macros: &[Macro],
    macro_inst_map: &HashMap<InstId, usize>,
    layout: &Layout,
) -> AdjWeightMap {
    let n = macros.len();
    let mut adj = AdjWeightMap::new();
    for vertex in &graph.vertices {
        let consumer = match owner(db, macro_inst_map, layout, vertex) {
            PinOwner::MacroPin { index, dir } if consumes(dir) => index,
            PinOwner::Terminal { edge, dir }
                if matches!(dir, PortDirection::Output | PortDirection::InOut) =>
            {
                n + edge.index()
            }
            _ => continue,
        };
        for p in graph.preds(vertex.id) {
            let driver = match owner(db, macro_inst_map, layout, graph.vertex(p)) {
                PinOwner::MacroPin { index, dir } if drives(dir) => index,
                PinOwner::Terminal { edge, dir }
                    if matches!(dir, PortDirection::Input | PortDirection::InOut) =>
                {
                    n + edge.index()
                }
                _ => continue,
            };
            if driver != consumer {
                *adj.entry((driver, consumer)).or_insert(0) += 1;
            }
        }
    }
    adj
}

/// Reports per-edge boundary pin counts through the diagnostic sink.
pub fn report_edge_pin_counts(db: &dyn LayoutDb, layout: &Layout, sink: &DiagnosticSink) {
    let mut counts = [0usize; CORE_EDGE_COUNT];
    for t in db.terminals() {
        let term = db.terminal(t);
        counts[nearest_edge(layout, term.x, term.y).index()] += 1;
    }
    let mut diag = Diagnostic::note(
        DiagnosticCode::new(Category::Place, 1),
        "boundary pin counts per edge",
    );
    for edge in CoreEdge::ALL {
        diag = diag.with_note(format!("{}: {}", edge, counts[edge.index()]));
    }
    sink.emit(diag);
}

/// The dense weight matrix materialized from an [`AdjWeightMap`].
///
/// Indexed by macro index, with the four trailing slots reserved for the
/// West, East, North, South pseudo-macros in that fixed order. Gives the
/// wirelength evaluation O(1) lookups.
#[derive(Debug, Clone)]
pub struct MacroWeights {
    macro_count: usize,
    table: Vec<u32>,
}

impl MacroWeights {
    /// Materializes the dense matrix from the sparse map.
    pub fn from_adj_map(macro_count: usize, adj: &AdjWeightMap) -> Self {
        let size = macro_count + CORE_EDGE_COUNT;
        let mut table = vec![0u32; size * size];
        for (&(i, j), &w) in adj {
            debug_assert!(i < size && j < size && i != j);
            if i < size && j < size {
                table[i * size + j] = w;
            }
        }
        Self { macro_count, table }
    }

    /// Returns the number of real macros.
    pub fn macro_count(&self) -> usize {
        self.macro_count
    }

    /// Returns the full matrix dimension (macros plus the four edges).
    pub fn size(&self) -> usize {
        self.macro_count + CORE_EDGE_COUNT
    }

    /// Returns the weight between indices `i` and `j`.
    ///
    /// Indices outside the matrix are a programming-contract violation
    /// and abort with a panic rather than corrupting the evaluation.
    pub fn weight(&self, i: usize, j: usize) -> u32 {
        assert!(
            i < self.size() && j < self.size(),
            "macro index ({i}, {j}) out of weight matrix bounds {}",
            self.size()
        );
        self.table[i * self.size() + j]
    }

    /// Bounds-checked lookup returning `None` for out-of-range indices.
    pub fn try_weight(&self, i: usize, j: usize) -> Option<u32> {
        if i < self.size() && j < self.size() {
            Some(self.table[i * self.size() + j])
        } else {
            None
        }
    }

    /// Returns whether `index` denotes one of the edge pseudo-macros.
    pub fn is_edge_index(&self, index: usize) -> bool {
        index >= self.macro_count && index < self.size()
    }

    /// Returns the edge denoted by `index`, if it is an edge index.
    pub fn edge_of_index(&self, index: usize) -> Option<CoreEdge> {
        if self.is_edge_index(index) {
            CoreEdge::from_index(index - self.macro_count)
        } else {
            None
        }
    }
}

impl AdjacencyView for MacroWeights {
    fn macro_count(&self) -> usize {
        self.macro_count
    }

    fn weight(&self, i: usize, j: usize) -> u32 {
        MacroWeights::weight(self, i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::build_macro_list;
    use mpl_common::Rect;
    use mpl_config::{GlobalConfig, LocalConfig};
    use mpl_db::{InstRecord, MemDb, TermRecord};

    /// Two macros in a 100x100 core with one boundary terminal on each of
    /// the west and east edges.
    fn make_db() -> MemDb {
        let mut db = MemDb::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        db.add_instance(InstRecord {
            name: "ram_a".into(),
            bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            is_block: true,
        });
        db.add_instance(InstRecord {
            name: "ram_b".into(),
            bbox: Rect::new(50.0, 50.0, 60.0, 60.0),
            is_block: true,
        });
        db.add_instance(InstRecord {
            name: "ff_0".into(),
            bbox: Rect::new(20.0, 20.0, 21.0, 21.0),
            is_block: false,
        });
        db.add_terminal(TermRecord {
            name: "din".into(),
            x: 0.0,
            y: 50.0,
            direction: PortDirection::Input,
        });
        db.add_terminal(TermRecord {
            name: "dout".into(),
            x: 100.0,
            y: 50.0,
            direction: PortDirection::Output,
        });
        db
    }

    fn setup(db: &MemDb) -> (Vec<Macro>, HashMap<InstId, usize>, Layout) {
        let (macros, map) = build_macro_list(db, &GlobalConfig::default(), &LocalConfig::default());
        let layout = Layout::new(db.core_area());
        (macros, map, layout)
    }

    fn inst_pin(db: &MemDb, name: &str, pin: &str) -> PinRef {
        PinRef::InstPin {
            inst: db.instance_by_name(name).unwrap(),
            pin: pin.to_string(),
        }
    }

    #[test]
    fn direct_combinational_path() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let b_in = g.add_vertex(
            inst_pin(&db, "ram_b", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, b_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert_eq!(adj.get(&(0, 1)), Some(&1));
        assert!(!sink.has_errors());
    }

    #[test]
    fn fanin_crosses_intermediate_logic() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        // ram_a/DO -> ff_0/A -> ff_0/Z -> ram_b/DI, all combinational.
        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let buf_in = g.add_vertex(
            inst_pin(&db, "ff_0", "A"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        let buf_out = g.add_vertex(
            inst_pin(&db, "ff_0", "Z"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let b_in = g.add_vertex(
            inst_pin(&db, "ram_b", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, buf_in);
        g.add_edge(buf_in, buf_out);
        g.add_edge(buf_out, b_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert_eq!(adj.get(&(0, 1)), Some(&1));
    }

    #[test]
    fn register_blocks_fanin_without_copy() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        // ram_a/DO -> ff_0/D. The register has no paired Q vertex, so the
        // cone ends there and no macro pair is recorded.
        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let d = g.add_vertex(
            inst_pin(&db, "ff_0", "D"),
            PortDirection::Input,
            VertexKind::SequentialInput,
        );
        let b_in = g.add_vertex(
            inst_pin(&db, "ram_b", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, d);
        // A dangling combinational edge out of the D pin must not leak
        // the cone.
        g.add_edge(d, b_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert_eq!(adj.get(&(0, 1)), None);
    }

    #[test]
    fn copy_across_register_preserves_connectivity() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        // ram_a/DO -> ff_0/D, ff_0/Q -> ram_b/DI. The copy pass carries
        // the cone across the paired D->Q boundary.
        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let d = g.add_vertex(
            inst_pin(&db, "ff_0", "D"),
            PortDirection::Input,
            VertexKind::SequentialInput,
        );
        let q = g.add_vertex(
            inst_pin(&db, "ff_0", "Q"),
            PortDirection::Output,
            VertexKind::SequentialOutput,
        );
        let b_in = g.add_vertex(
            inst_pin(&db, "ram_b", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, d);
        g.add_edge(q, b_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert_eq!(adj.get(&(0, 1)), Some(&1));
    }

    #[test]
    fn boundary_terminals_become_edge_pseudo_macros() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);
        let n = macros.len();

        // din (west) -> ram_a/DI; ram_a/DO -> dout (east).
        let mut g = TimingGraph::new();
        let din = g.add_vertex(
            PinRef::Term(db.terminals()[0]),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        let a_in = g.add_vertex(
            inst_pin(&db, "ram_a", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let dout = g.add_vertex(
            PinRef::Term(db.terminals()[1]),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        g.add_edge(din, a_in);
        g.add_edge(a_out, dout);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        let west = n + CoreEdge::West.index();
        let east = n + CoreEdge::East.index();
        assert_eq!(adj.get(&(west, 0)), Some(&1));
        assert_eq!(adj.get(&(0, east)), Some(&1));
    }

    #[test]
    fn no_self_pairs_recorded() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        // A macro feeding back into itself must not produce (m, m).
        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let a_in = g.add_vertex(
            inst_pin(&db, "ram_a", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, a_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert!(adj.iter().all(|(&(i, j), _)| i != j));
        assert!(adj.is_empty());
    }

    #[test]
    fn weight_counts_per_pin_connection() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        // Two distinct input pins on ram_b fed by ram_a: weight 2.
        let mut g = TimingGraph::new();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let b_in0 = g.add_vertex(
            inst_pin(&db, "ram_b", "DI0"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        let b_in1 = g.add_vertex(
            inst_pin(&db, "ram_b", "DI1"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, b_in0);
        g.add_edge(a_out, b_in1);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert_eq!(adj.get(&(0, 1)), Some(&2));
    }

    #[test]
    fn fallback_weights_direct_pairs_and_warns() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        let mut g = TimingGraph::without_liberty();
        let a_out = g.add_vertex(
            inst_pin(&db, "ram_a", "DO"),
            PortDirection::Output,
            VertexKind::Combinational,
        );
        let b_in = g.add_vertex(
            inst_pin(&db, "ram_b", "DI"),
            PortDirection::Input,
            VertexKind::Combinational,
        );
        g.add_edge(a_out, b_in);

        let sink = DiagnosticSink::new();
        let adj = find_adjacencies(&db, &g, &macros, &map, &layout, &sink);
        assert!(adj.get(&(0, 1)).copied().unwrap_or(0) >= 1);

        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, mpl_diagnostics::Severity::Warning);
    }

    #[test]
    fn deterministic_weights() {
        let db = make_db();
        let (macros, map, layout) = setup(&db);

        let build = || {
            let mut g = TimingGraph::new();
            let a_out = g.add_vertex(
                inst_pin(&db, "ram_a", "DO"),
                PortDirection::Output,
                VertexKind::Combinational,
            );
            let b_in = g.add_vertex(
                inst_pin(&db, "ram_b", "DI"),
                PortDirection::Input,
                VertexKind::Combinational,
            );
            g.add_edge(a_out, b_in);
            let sink = DiagnosticSink::new();
            find_adjacencies(&db, &g, &macros, &map, &layout, &sink)
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn edge_pin_counts_reported() {
        let db = make_db();
        let layout = Layout::new(db.core_area());
        let sink = DiagnosticSink::new();
        report_edge_pin_counts(&db, &layout, &sink);

        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].notes.iter().any(|n| n == "West: 1"));
        assert!(diags[0].notes.iter().any(|n| n == "East: 1"));
        assert!(diags[0].notes.iter().any(|n| n == "North: 0"));
    }

    #[test]
    fn dense_matrix_matches_sparse_map() {
        let mut adj = AdjWeightMap::new();
        adj.insert((0, 1), 3);
        adj.insert((1, 2), 1); // edge index (west) for n = 2
        let weights = MacroWeights::from_adj_map(2, &adj);

        assert_eq!(weights.size(), 6);
        assert_eq!(weights.weight(0, 1), 3);
        assert_eq!(weights.weight(1, 0), 0);
        assert_eq!(weights.weight(1, 2), 1);
        assert_eq!(weights.try_weight(0, 1), Some(3));
        assert_eq!(weights.try_weight(9, 0), None);
        assert!(weights.is_edge_index(2));
        assert!(!weights.is_edge_index(1));
        assert_eq!(weights.edge_of_index(2), Some(CoreEdge::West));
        assert_eq!(weights.edge_of_index(5), Some(CoreEdge::South));
        assert_eq!(weights.edge_of_index(0), None);
    }

    #[test]
    #[should_panic(expected = "out of weight matrix bounds")]
    fn out_of_range_weight_panics() {
        let weights = MacroWeights::from_adj_map(1, &AdjWeightMap::new());
        let _ = weights.weight(5, 0);
    }
}
