//! The recursive bisection tree.

use crate::footprint::MacroFootprint;
use crate::AdjacencyView;
use mpl_common::Rect;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Aspect ratio above which the cut orientation is forced (longer side).
const FORCED_CUT_ASPECT: f64 = 1.25;

/// Clamp range for the cut position as a share of the parent extent.
const MIN_CUT_SHARE: f64 = 0.15;
const MAX_CUT_SHARE: f64 = 0.85;

/// A node of the recursive spatial bisection tree.
///
/// Each node owns a rectangular region and the subset of macros assigned
/// to it. Interior nodes own exactly two children that tile the parent
/// region; leaves hold the final macro-to-region assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    bounds: Rect,
    macros: Vec<usize>,
    children: Option<Box<(Partition, Partition)>>,
}

impl Partition {
    /// Roots a new partition over `bounds` holding all of `macros`.
    pub fn new(bounds: Rect, macros: Vec<usize>) -> Self {
        Self {
            bounds,
            macros,
            children: None,
        }
    }

    /// Returns the region assigned to this node.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the macros assigned to this node.
    pub fn macros(&self) -> &[usize] {
        &self.macros
    }

    /// Returns whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Returns the two children of an interior node.
    pub fn children(&self) -> Option<(&Partition, &Partition)> {
        self.children.as_ref().map(|c| (&c.0, &c.1))
    }

    /// Returns the leaf region assigned to the given macro, if any.
    pub fn assigned_region(&self, macro_index: usize) -> Option<Rect> {
        match &self.children {
            None => {
                if self.macros.contains(&macro_index) {
                    Some(self.bounds)
                } else {
                    None
                }
            }
            Some(c) => c
                .0
                .assigned_region(macro_index)
                .or_else(|| c.1.assigned_region(macro_index)),
        }
    }

    /// Collects all leaf nodes of the tree.
    pub fn leaves(&self) -> Vec<&Partition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Partition>) {
        match &self.children {
            None => out.push(self),
            Some(c) => {
                c.0.collect_leaves(out);
                c.1.collect_leaves(out);
            }
        }
    }

    /// Splits this leaf into two children.
    ///
    /// The cut orientation follows the longer side of the region (random
    /// for near-square regions). Macros are ordered by their affinity to
    /// the low-side chip edge along the cut axis and split into two groups
    /// balanced by effective area; the cut position is proportional to the
    /// low group's area share.
    ///
    /// Returns `false` without modifying the node when it is not a leaf or
    /// holds fewer than two macros.
    pub fn subdivide(
        &mut self,
        footprints: &[MacroFootprint],
        adj: &dyn AdjacencyView,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_leaf() || self.macros.len() < 2 {
            return false;
        }

        let aspect = self.bounds.width() / self.bounds.height().max(f64::MIN_POSITIVE);
        let vertical = if aspect > FORCED_CUT_ASPECT {
            true
        } else if aspect < 1.0 / FORCED_CUT_ASPECT {
            false
        } else {
            rng.gen_bool(0.5)
        };

        let n = adj.macro_count();
        // Low side along the cut axis: west for a vertical cut, south for
        // a horizontal one.
        let (low_edge, high_edge) = if vertical { (n, n + 1) } else { (n + 3, n + 2) };

        let mut ordered = self.macros.clone();
        ordered.sort_by_key(|&m| {
            let pull = adj.weight(m, low_edge) as i64 + adj.weight(low_edge, m) as i64
                - adj.weight(m, high_edge) as i64
                - adj.weight(high_edge, m) as i64;
            (std::cmp::Reverse(pull), m)
        });

        let total_area: f64 = ordered.iter().map(|&m| footprints[m].effective_area()).sum();
        let mut low_group = Vec::new();
        let mut low_area = 0.0;
        let mut high_group: Vec<usize> = Vec::new();
        for (i, &m) in ordered.iter().enumerate() {
            let is_last = i == ordered.len() - 1;
            let take_low = low_group.is_empty()
                || (low_area < total_area / 2.0 && !(high_group.is_empty() && is_last));
            if take_low {
                low_area += footprints[m].effective_area();
                low_group.push(m);
            } else {
                high_group.push(m);
            }
        }

        let share = if total_area > 0.0 {
            (low_area / total_area).clamp(MIN_CUT_SHARE, MAX_CUT_SHARE)
        } else {
            0.5
        };

        let b = self.bounds;
        let (low_rect, high_rect) = if vertical {
            let cut = b.lx + b.width() * share;
            (
                Rect::new(b.lx, b.ly, cut, b.uy),
                Rect::new(cut, b.ly, b.ux, b.uy),
            )
        } else {
            let cut = b.ly + b.height() * share;
            (
                Rect::new(b.lx, b.ly, b.ux, cut),
                Rect::new(b.lx, cut, b.ux, b.uy),
            )
        };

        self.children = Some(Box::new((
            Partition::new(low_rect, low_group),
            Partition::new(high_rect, high_group),
        )));
        true
    }

    /// Recursively subdivides until every leaf holds at most one macro.
    pub fn partition_to_leaves(
        &mut self,
        footprints: &[MacroFootprint],
        adj: &dyn AdjacencyView,
        rng: &mut impl Rng,
    ) {
        if self.is_leaf() {
            if !self.subdivide(footprints, adj, rng) {
                return;
            }
        }
        if let Some(c) = &mut self.children {
            c.0.partition_to_leaves(footprints, adj, rng);
            c.1.partition_to_leaves(footprints, adj, rng);
        }
    }
}
