//! Leaf packing: turning assigned regions into concrete coordinates.

use crate::footprint::MacroFootprint;
use crate::partition::Partition;
use crate::AdjacencyView;
use mpl_common::Rect;
use serde::{Deserialize, Serialize};

/// Number of pull-refinement sweeps over all macros.
const PULL_SWEEPS: usize = 3;

/// Geometric comparison tolerance for fit checks.
const FIT_EPS: f64 = 1e-9;

/// A macro with its final lower-left coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackedMacro {
    /// The macro index.
    pub index: usize,
    /// Final lower-left x of the macro block.
    pub lx: f64,
    /// Final lower-left y of the macro block.
    pub ly: f64,
}

/// Errors produced while packing leaf regions.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// A macro (plus its halo and channel margins) does not fit the
    /// region the partitioner assigned to it.
    #[error("macro {index} does not fit its assigned region")]
    DoesNotFit {
        /// The macro index that failed to fit.
        index: usize,
    },
}

impl Partition {
    /// Packs every leaf into concrete macro coordinates.
    ///
    /// Each macro is first placed at its region's lower-left corner (inset
    /// by its halo), then pulled toward the weighted centroid of its
    /// adjacency partners — connected macros and chip edges — clamped so
    /// the macro plus margins stays inside its own region. Regions are
    /// disjoint, so the pull step cannot introduce overlaps.
    ///
    /// Must be called on the root of a fully subdivided tree. Fails with
    /// [`PackError::DoesNotFit`] when any macro cannot fit its region.
    pub fn pack(
        &self,
        footprints: &[MacroFootprint],
        adj: &dyn AdjacencyView,
    ) -> Result<Vec<PackedMacro>, PackError> {
        let root = self.bounds();
        let mut placed: Vec<PackedMacro> = Vec::new();
        let mut region_of: Vec<(usize, Rect)> = Vec::new();

        for leaf in self.leaves() {
            let region = leaf.bounds();
            let mut cursor = 0.0;
            let single = leaf.macros().len() == 1;
            for &m in leaf.macros() {
                let fp = &footprints[m];
                if cursor + fp.effective_width() > region.width() + FIT_EPS
                    || fp.effective_height() > region.height() + FIT_EPS
                {
                    return Err(PackError::DoesNotFit { index: m });
                }
                placed.push(PackedMacro {
                    index: m,
                    lx: region.lx + cursor + fp.halo_x,
                    ly: region.ly + fp.halo_y,
                });
                // Only singly-occupied regions participate in the pull
                // refinement; shared regions keep the shelf order.
                if single {
                    region_of.push((m, region));
                }
                cursor += fp.effective_width();
            }
        }

        placed.sort_by_key(|p| p.index);
        pull_toward_partners(&mut placed, &region_of, footprints, adj, root);
        Ok(placed)
    }
}

/// Iteratively moves each macro toward the weighted centroid of its
/// adjacency partners, clamped to its own region.
fn pull_toward_partners(
    placed: &mut [PackedMacro],
    regions: &[(usize, Rect)],
    footprints: &[MacroFootprint],
    adj: &dyn AdjacencyView,
    root: Rect,
) {
    let n = adj.macro_count();
    let pos_of = |placed: &[PackedMacro], m: usize| -> Option<usize> {
        placed.iter().position(|p| p.index == m)
    };

    for _ in 0..PULL_SWEEPS {
        let mut moved = false;
        for &(m, region) in regions {
            let fp = &footprints[m];
            let (target_x, target_y) = match partner_centroid(placed, footprints, adj, root, n, m) {
                Some(c) => c,
                None => continue,
            };

            let lo_x = region.lx + fp.halo_x;
            let hi_x = (region.ux - fp.halo_x - fp.channel_x - fp.width).max(lo_x);
            let lo_y = region.ly + fp.halo_y;
            let hi_y = (region.uy - fp.halo_y - fp.channel_y - fp.height).max(lo_y);

            let new_lx = (target_x - fp.width / 2.0).clamp(lo_x, hi_x);
            let new_ly = (target_y - fp.height / 2.0).clamp(lo_y, hi_y);

            if let Some(i) = pos_of(placed, m) {
                if placed[i].lx != new_lx || placed[i].ly != new_ly {
                    placed[i].lx = new_lx;
                    placed[i].ly = new_ly;
                    moved = true;
                }
            }
        }
        if !moved {
            break;
        }
    }
}

/// Computes the weighted centroid of a macro's adjacency partners.
///
/// Partners with a nonzero weight in either direction contribute their
/// current center (for real macros) or their edge midpoint (for the four
/// chip-edge pseudo-macros). Returns `None` for unconnected macros.
fn partner_centroid(
    placed: &[PackedMacro],
    footprints: &[MacroFootprint],
    adj: &dyn AdjacencyView,
    root: Rect,
    n: usize,
    m: usize,
) -> Option<(f64, f64)> {
    let (root_cx, root_cy) = root.center();
    let mut sum_w = 0.0;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;

    for j in 0..n + 4 {
        if j == m {
            continue;
        }
        let w = adj.weight(m, j) + adj.weight(j, m);
        if w == 0 {
            continue;
        }
        let (cx, cy) = if j < n {
            match placed.iter().find(|p| p.index == j) {
                Some(p) => (
                    p.lx + footprints[j].width / 2.0,
                    p.ly + footprints[j].height / 2.0,
                ),
                None => continue,
            }
        } else {
            // West, east, north, south midpoints in fixed index order.
            match j - n {
                0 => (root.lx, root_cy),
                1 => (root.ux, root_cy),
                2 => (root_cx, root.uy),
                _ => (root_cx, root.ly),
            }
        };
        sum_w += w as f64;
        sum_x += w as f64 * cx;
        sum_y += w as f64 * cy;
    }

    if sum_w > 0.0 {
        Some((sum_x / sum_w, sum_y / sum_w))
    } else {
        None
    }
}
