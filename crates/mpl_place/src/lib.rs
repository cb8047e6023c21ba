//! Macro placement engine for the mpl toolkit.
//!
//! This crate places large fixed-footprint circuit blocks ("macros")
//! inside a fence region so that interconnect cost between macros (and
//! between macros and chip-boundary pins) is minimized, while respecting
//! per-macro keep-out halos and routing channel margins.
//!
//! # Pipeline
//!
//! 1. **Configure** — global halo/channel/fence defaults plus per-macro
//!    local overrides, from setters or TOML files
//! 2. **Build** — one [`Macro`] per block instance in the layout database
//! 3. **Weigh** — trace the timing graph into a weighted adjacency model,
//!    with the four chip edges as pseudo-macros
//! 4. **Place** — run several recursive-bisection trials in parallel and
//!    keep the one with minimum weighted wirelength
//! 5. **Commit** — write the winning coordinates back to the database
//!
//! # Usage
//!
//! ```ignore
//! use mpl_place::{MacroPlacer, PlacerOptions};
//!
//! let mut placer = MacroPlacer::new(PlacerOptions::default());
//! placer.init(&mut db, &timing_graph, &sink);
//! placer.set_halo(2.0, 2.0);
//! placer.place_macros()?;
//! println!("wirelength: {}", placer.weighted_wirelength());
//! ```

#![warn(missing_docs)]

pub mod adjacency;
pub mod error;
pub mod layout;
pub mod macros;
pub mod placer;

pub use adjacency::{find_adjacencies, AdjWeightMap, MacroSet, MacroWeights, VertexFaninMap};
pub use error::PlaceError;
pub use layout::{nearest_edge, CoreEdge, Layout, CORE_EDGE_COUNT};
pub use macros::{build_macro_list, Macro, MacroLocalInfo};
pub use placer::{MacroPlacer, PlacerOptions, PlacerState};

#[cfg(test)]
mod tests {
    use super::*;
    use mpl_common::Rect;
    use mpl_db::{InstRecord, LayoutDb, MemDb, PortDirection};
    use mpl_diagnostics::DiagnosticSink;
    use mpl_timing::{PinRef, TimingGraph, VertexKind};

    /// Four connected macros placed through the full public surface.
    #[test]
    fn full_pipeline_four_macros() {
        let mut db = MemDb::new(Rect::new(0.0, 0.0, 60.0, 60.0));
        for i in 0..4 {
            db.add_instance(InstRecord {
                name: format!("ram_{i}"),
                bbox: Rect::new(0.0, 0.0, 8.0, 8.0),
                is_block: true,
            });
        }

        // A chain ram_0 -> ram_1 -> ram_2 -> ram_3.
        let mut g = TimingGraph::new();
        let mut prev_out = None;
        for i in 0..4 {
            let inst = db.instance_by_name(&format!("ram_{i}")).unwrap();
            let din = g.add_vertex(
                PinRef::InstPin {
                    inst,
                    pin: "DI".into(),
                },
                PortDirection::Input,
                VertexKind::Combinational,
            );
            let dout = g.add_vertex(
                PinRef::InstPin {
                    inst,
                    pin: "DO".into(),
                },
                PortDirection::Output,
                VertexKind::Combinational,
            );
            if let Some(prev) = prev_out {
                g.add_edge(prev, din);
            }
            prev_out = Some(dout);
        }

        let sink = DiagnosticSink::new();
        let mut placer = MacroPlacer::default();
        placer.init(&mut db, &g, &sink);
        placer.set_halo(1.0, 1.0);
        placer.place_macros().unwrap();

        assert_eq!(placer.state(), PlacerState::Solved);
        assert_eq!(placer.weight(0, 1), 1);
        assert_eq!(placer.weight(1, 2), 1);
        assert_eq!(placer.weight(2, 3), 1);
        assert_eq!(placer.weight(0, 3), 0);
        assert!(placer.weighted_wirelength() > 0.0);
        drop(placer);

        // All macros inside the core, pairwise non-overlapping.
        let boxes: Vec<Rect> = (0..4)
            .map(|i| {
                db.instance(db.instance_by_name(&format!("ram_{i}")).unwrap())
                    .bbox
            })
            .collect();
        let core = db.core_area();
        for b in &boxes {
            assert!(core.contains_rect(b));
        }
        for i in 0..4 {
            for j in i + 1..4 {
                let (a, b) = (&boxes[i], &boxes[j]);
                let overlap = a.lx < b.ux && b.lx < a.ux && a.ly < b.uy && b.ly < a.uy;
                assert!(!overlap, "macros {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn reexports_available() {
        let _ = MacroPlacer::default();
        let _ = PlacerOptions::default();
        let _ = CoreEdge::West.index();
        let _ = MacroLocalInfo::default();
        let _ = AdjWeightMap::new();
    }
}
