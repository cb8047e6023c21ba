//! The placement orchestrator.
//!
//! [`MacroPlacer`] drives the full pipeline: configuration, macro-list
//! construction, adjacency weighting, the multi-trial partitioning loop,
//! best-solution selection by weighted wirelength, and the final
//! coordinate write-back to the layout database.
//!
//! Trials are mutually independent given the fixed weight model, so they
//! run in parallel on isolated partition trees; only the reduction that
//! picks the minimum-wirelength solution is sequential. All randomness
//! derives from `base_seed + trial index`, so a run is deterministic per
//! configuration.

use crate::adjacency::{find_adjacencies, report_edge_pin_counts, AdjWeightMap, MacroWeights};
use crate::error::PlaceError;
use crate::layout::{CoreEdge, Layout, CORE_EDGE_COUNT};
use crate::macros::{build_macro_list, Macro};
use mpl_common::{InternalError, Rect};
use mpl_config::{FenceConfig, GlobalConfig, LocalConfig};
use mpl_db::{InstId, LayoutDb};
use mpl_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use mpl_partition::{MacroFootprint, PackError, PackedMacro, Partition};
use mpl_timing::TimingGraph;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

/// Tunables for the placement trial loop.
#[derive(Debug, Clone)]
pub struct PlacerOptions {
    /// Number of partitioning trials to evaluate.
    pub trial_count: usize,
    /// Base seed; trial `t` uses `base_seed + t`.
    pub base_seed: u64,
}

impl Default for PlacerOptions {
    fn default() -> Self {
        Self {
            trial_count: 4,
            base_seed: 0,
        }
    }
}

/// The lifecycle of a placement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacerState {
    /// No collaborators bound yet.
    Uninitialized,
    /// Collaborators bound; configuration may still change.
    Configured,
    /// The macro list has been built.
    MacroListBuilt,
    /// The adjacency weights have been computed.
    WeightsComputed,
    /// Trials are running.
    Placing,
    /// A best solution has been committed.
    Solved,
}

/// The top-level macro placement driver.
pub struct MacroPlacer<'a> {
    state: PlacerState,
    db: Option<&'a mut dyn LayoutDb>,
    graph: Option<&'a TimingGraph>,
    sink: Option<&'a DiagnosticSink>,

    global: GlobalConfig,
    local: LocalConfig,
    global_config_path: Option<PathBuf>,
    local_config_path: Option<PathBuf>,

    macros: Vec<Macro>,
    macro_inst_map: HashMap<InstId, usize>,
    weights: Option<MacroWeights>,
    layout: Option<Layout>,
    sol_count: usize,
    options: PlacerOptions,
}

impl<'a> MacroPlacer<'a> {
    /// Creates an unconfigured placer with the given options.
    pub fn new(options: PlacerOptions) -> Self {
        Self {
            state: PlacerState::Uninitialized,
            db: None,
            graph: None,
            sink: None,
            global: GlobalConfig::default(),
            local: LocalConfig::default(),
            global_config_path: None,
            local_config_path: None,
            macros: Vec::new(),
            macro_inst_map: HashMap::new(),
            weights: None,
            layout: None,
            sol_count: 0,
            options,
        }
    }

    /// Binds the external collaborators and transitions to `Configured`.
    pub fn init(
        &mut self,
        db: &'a mut dyn LayoutDb,
        graph: &'a TimingGraph,
        sink: &'a DiagnosticSink,
    ) {
        self.db = Some(db);
        self.graph = Some(graph);
        self.sink = Some(sink);
        self.state = PlacerState::Configured;
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> PlacerState {
        self.state
    }

    fn config_mutable(&self, what: &str) -> bool {
        match self.state {
            PlacerState::Placing | PlacerState::Solved => {
                if let Some(sink) = self.sink {
                    sink.emit(Diagnostic::warning(
                        DiagnosticCode::new(Category::Place, 10),
                        format!("{what} ignored: placement already solved"),
                    ));
                }
                false
            }
            _ => true,
        }
    }

    /// Sets the default keep-out halo applied around every macro.
    pub fn set_halo(&mut self, halo_x: f64, halo_y: f64) {
        if !self.config_mutable("set_halo") {
            return;
        }
        self.global.halo_x = halo_x;
        self.global.halo_y = halo_y;
    }

    /// Sets the default routing channel margin reserved next to every macro.
    pub fn set_channel(&mut self, channel_x: f64, channel_y: f64) {
        if !self.config_mutable("set_channel") {
            return;
        }
        self.global.channel_x = channel_x;
        self.global.channel_y = channel_y;
    }

    /// Confines placement to the given fence rectangle.
    pub fn set_fence_region(&mut self, lx: f64, ly: f64, ux: f64, uy: f64) {
        if !self.config_mutable("set_fence_region") {
            return;
        }
        self.global.fence = Some(FenceConfig { lx, ly, ux, uy });
    }

    /// Sets the reporting verbosity level.
    pub fn set_verbose_level(&mut self, verbose: u32) {
        if !self.config_mutable("set_verbose_level") {
            return;
        }
        self.global.verbose = verbose;
    }

    /// Names the global configuration file, loaded when placement runs.
    ///
    /// Values from the file take precedence over earlier setter calls.
    pub fn set_global_config(&mut self, path: impl Into<PathBuf>) {
        if !self.config_mutable("set_global_config") {
            return;
        }
        self.global_config_path = Some(path.into());
    }

    /// Names the local (per-macro override) configuration file.
    pub fn set_local_config(&mut self, path: impl Into<PathBuf>) {
        if !self.config_mutable("set_local_config") {
            return;
        }
        self.local_config_path = Some(path.into());
    }

    /// Runs the full placement pipeline and commits the best solution.
    ///
    /// Parses and validates configuration, builds the macro list, computes
    /// the adjacency weight model, evaluates the configured number of
    /// partitioning trials in parallel, selects the trial with minimum
    /// weighted wirelength (lowest trial index on ties), and writes the
    /// winning coordinates into the macro records and the database.
    pub fn place_macros(&mut self) -> Result<(), PlaceError> {
        let graph = self.graph.ok_or(PlaceError::Uninitialized)?;
        let sink = self.sink.ok_or(PlaceError::Uninitialized)?;

        if let Some(path) = &self.global_config_path {
            self.global = mpl_config::load_global_config(path)?;
        }
        if let Some(path) = &self.local_config_path {
            self.local = mpl_config::load_local_config(path)?;
        }
        mpl_config::validate_global(&self.global)?;
        mpl_config::validate_local(&self.local)?;

        let db = self.db.as_deref().ok_or(PlaceError::Uninitialized)?;

        // The working layout is the fence region when one is configured,
        // the core area otherwise.
        let layout = Layout::new(match &self.global.fence {
            Some(f) => Rect::new(f.lx, f.ly, f.ux, f.uy),
            None => db.core_area(),
        });
        self.layout = Some(layout);

        let (macros, macro_inst_map) = build_macro_list(db, &self.global, &self.local);
        self.macros = macros;
        self.macro_inst_map = macro_inst_map;
        self.state = PlacerState::MacroListBuilt;

        if self.macros.is_empty() {
            sink.emit(Diagnostic::note(
                DiagnosticCode::new(Category::Place, 2),
                "no macro blocks found, nothing to place",
            ));
            self.sol_count = 0;
            self.state = PlacerState::Solved;
            return Ok(());
        }

        let adj = find_adjacencies(db, graph, &self.macros, &self.macro_inst_map, &layout, sink);
        let weights = MacroWeights::from_adj_map(self.macros.len(), &adj);
        self.state = PlacerState::WeightsComputed;

        if self.global.verbose >= 1 {
            report_edge_pin_counts(db, &layout, sink);
        }
        if self.global.verbose >= 2 {
            self.report_adjacencies(&adj, sink);
        }

        self.state = PlacerState::Placing;
        let footprints: Vec<MacroFootprint> = self.macros.iter().map(Macro::footprint).collect();
        let trial_count = self.options.trial_count.max(1);
        let base_seed = self.options.base_seed;

        let results: Vec<(usize, Result<(Partition, f64), PackError>)> = (0..trial_count)
            .into_par_iter()
            .map(|t| {
                (
                    t,
                    run_trial(base_seed + t as u64, &layout, &footprints, &weights),
                )
            })
            .collect();

        let mut best: Option<(usize, Partition, f64)> = None;
        for (t, result) in results {
            match result {
                Ok((part, wl)) => {
                    let better = match &best {
                        None => true,
                        Some((_, _, best_wl)) => wl < *best_wl,
                    };
                    if better {
                        best = Some((t, part, wl));
                    }
                }
                Err(err) => {
                    sink.emit(Diagnostic::warning(
                        DiagnosticCode::new(Category::Place, 3),
                        format!("trial {t} infeasible: {err}"),
                    ));
                }
            }
        }
        self.sol_count = trial_count;
        self.weights = Some(weights);

        let Some((_, best_part, _)) = best else {
            return Err(PlaceError::Infeasible {
                trials: trial_count,
            });
        };

        self.update_macro_coords(&best_part)?;
        self.commit_to_db()?;
        self.state = PlacerState::Solved;
        Ok(())
    }

    /// Writes each macro's coordinates from its assigned sub-region of a
    /// solved partition tree.
    pub fn update_macro_coords(&mut self, partition: &Partition) -> Result<(), PlaceError> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| InternalError::new("adjacency weights not computed"))?;
        let footprints: Vec<MacroFootprint> = self.macros.iter().map(Macro::footprint).collect();
        let placed = partition.pack(&footprints, weights).map_err(|e| {
            PlaceError::Internal(InternalError::new(format!(
                "packing a solved partition failed: {e}"
            )))
        })?;
        for p in placed {
            self.macros[p.index].lx = p.lx;
            self.macros[p.index].ly = p.ly;
        }
        Ok(())
    }

    /// Pushes the committed macro coordinates to the layout database.
    ///
    /// This is the only point at which external state mutates.
    pub fn commit_to_db(&mut self) -> Result<(), PlaceError> {
        let db = self.db.as_deref_mut().ok_or(PlaceError::Uninitialized)?;
        for m in &self.macros {
            db.set_instance_location(m.inst, m.lx, m.ly);
        }
        Ok(())
    }

    /// Returns the weighted wirelength of the current macro coordinates:
    /// the sum over adjacency pairs of weight times Manhattan distance
    /// between centers, with the edge pseudo-macros fixed at their edge
    /// midpoints. Returns 0.0 before weights are computed.
    pub fn weighted_wirelength(&self) -> f64 {
        let (Some(weights), Some(layout)) = (&self.weights, &self.layout) else {
            return 0.0;
        };
        let centers: Vec<(f64, f64)> = self.macros.iter().map(Macro::center).collect();
        weighted_wl(&centers, weights, layout)
    }

    /// Returns the number of placement trials evaluated.
    pub fn solution_count(&self) -> usize {
        self.sol_count
    }

    /// O(1) lookup into the dense weight matrix.
    ///
    /// Returns 0 before weights are computed; panics on out-of-range
    /// indices afterward (a programming-contract violation).
    pub fn weight(&self, i: usize, j: usize) -> u32 {
        match &self.weights {
            Some(w) => w.weight(i, j),
            None => 0,
        }
    }

    /// Returns the macro-list position of a database instance, if it is a
    /// placeable macro.
    pub fn macro_index(&self, inst: InstId) -> Option<usize> {
        self.macro_inst_map.get(&inst).copied()
    }

    /// Returns whether `index` denotes one of the edge pseudo-macros.
    pub fn macro_index_is_edge(&self, index: usize) -> bool {
        index >= self.macros.len() && index < self.macros.len() + CORE_EDGE_COUNT
    }

    /// Returns the display name of a weight-model index: the macro's
    /// instance name, or the edge name for a pseudo-macro.
    pub fn fanin_name(&self, index: usize) -> String {
        if index < self.macros.len() {
            self.macros[index].name.clone()
        } else {
            match CoreEdge::from_index(index - self.macros.len()) {
                Some(edge) => edge.name().to_string(),
                None => format!("#{index}"),
            }
        }
    }

    fn report_adjacencies(&self, adj: &AdjWeightMap, sink: &DiagnosticSink) {
        let mut diag = Diagnostic::note(
            DiagnosticCode::new(Category::Place, 4),
            "macro adjacency weights",
        );
        for (&(i, j), &w) in adj {
            diag = diag.with_note(format!(
                "{} -> {}: {w}",
                self.fanin_name(i),
                self.fanin_name(j)
            ));
        }
        sink.emit(diag);
    }
}

impl Default for MacroPlacer<'_> {
    fn default() -> Self {
        Self::new(PlacerOptions::default())
    }
}

/// Runs one partitioning trial and scores it.
fn run_trial(
    seed: u64,
    layout: &Layout,
    footprints: &[MacroFootprint],
    weights: &MacroWeights,
) -> Result<(Partition, f64), PackError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut part = Partition::new(layout.rect(), (0..footprints.len()).collect());
    part.partition_to_leaves(footprints, weights, &mut rng);
    let placed = part.pack(footprints, weights)?;
    let wl = weighted_wl_of(&placed, footprints, weights, layout);
    Ok((part, wl))
}

/// Scores a packed trial by weighted wirelength.
fn weighted_wl_of(
    placed: &[PackedMacro],
    footprints: &[MacroFootprint],
    weights: &MacroWeights,
    layout: &Layout,
) -> f64 {
    let mut centers = vec![(0.0, 0.0); weights.macro_count()];
    for p in placed {
        centers[p.index] = (
            p.lx + footprints[p.index].width / 2.0,
            p.ly + footprints[p.index].height / 2.0,
        );
    }
    weighted_wl(&centers, weights, layout)
}

/// Sum over all weight-matrix entries of weight times Manhattan distance.
fn weighted_wl(centers: &[(f64, f64)], weights: &MacroWeights, layout: &Layout) -> f64 {
    let n = weights.macro_count();
    let pos = |index: usize| -> (f64, f64) {
        if index < n {
            centers[index]
        } else {
            CoreEdge::ALL[index - n].midpoint(layout)
        }
    };

    let mut wl = 0.0;
    for i in 0..weights.size() {
        for j in 0..weights.size() {
            if i == j {
                continue;
            }
            let w = weights.weight(i, j);
            if w == 0 {
                continue;
            }
            let (x1, y1) = pos(i);
            let (x2, y2) = pos(j);
            wl += w as f64 * ((x1 - x2).abs() + (y1 - y2).abs());
        }
    }
    wl
}
