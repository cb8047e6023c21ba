//! Layout rectangles and chip-edge classification.
//!
//! [`Layout`] is the working rectangle of a placement run: the fence region
//! when one is configured, otherwise the chip core area. Child layouts are
//! derived from a parent layout plus a partition's assigned bounds.
//!
//! [`CoreEdge`] names the four chip boundary sides. Boundary terminals
//! classify to exactly one edge by nearest distance; the four edges also
//! serve as pseudo-macros in the adjacency weight model, occupying the
//! reserved trailing indices of the weight matrix.

use mpl_common::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The number of chip edges (and reserved pseudo-macro indices).
pub const CORE_EDGE_COUNT: usize = 4;

/// A rectangular placement region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    rect: Rect,
}

impl Layout {
    /// Creates a layout from a rectangle.
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Derives a child layout from a parent and a partition's assigned bounds.
    pub fn from_partition(parent: &Layout, assigned: Rect) -> Self {
        debug_assert!(parent.rect.contains_rect(&assigned));
        Self { rect: assigned }
    }

    /// Returns the underlying rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Lower-left x.
    pub fn lx(&self) -> f64 {
        self.rect.lx
    }

    /// Lower-left y.
    pub fn ly(&self) -> f64 {
        self.rect.ly
    }

    /// Upper-right x.
    pub fn ux(&self) -> f64 {
        self.rect.ux
    }

    /// Upper-right y.
    pub fn uy(&self) -> f64 {
        self.rect.uy
    }
}

/// One of the four chip boundary sides.
///
/// The discriminant order is stable: West, East, North, South map to
/// indices 0..3, and the weight matrix reserves its trailing four slots
/// in exactly this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoreEdge {
    /// The x = lx boundary.
    West,
    /// The x = ux boundary.
    East,
    /// The y = uy boundary.
    North,
    /// The y = ly boundary.
    South,
}

impl CoreEdge {
    /// All four edges in stable index order.
    pub const ALL: [CoreEdge; CORE_EDGE_COUNT] =
        [CoreEdge::West, CoreEdge::East, CoreEdge::North, CoreEdge::South];

    /// Returns the stable index of this edge (0..4).
    pub fn index(self) -> usize {
        match self {
            CoreEdge::West => 0,
            CoreEdge::East => 1,
            CoreEdge::North => 2,
            CoreEdge::South => 3,
        }
    }

    /// Returns the edge with the given stable index.
    pub fn from_index(index: usize) -> Option<CoreEdge> {
        CoreEdge::ALL.get(index).copied()
    }

    /// Returns the display name of this edge.
    pub fn name(self) -> &'static str {
        match self {
            CoreEdge::West => "West",
            CoreEdge::East => "East",
            CoreEdge::North => "North",
            CoreEdge::South => "South",
        }
    }

    /// Returns the midpoint of this edge on the given layout, the fixed
    /// position of the corresponding pseudo-macro.
    pub fn midpoint(self, layout: &Layout) -> (f64, f64) {
        let (cx, cy) = layout.rect().center();
        match self {
            CoreEdge::West => (layout.lx(), cy),
            CoreEdge::East => (layout.ux(), cy),
            CoreEdge::North => (cx, layout.uy()),
            CoreEdge::South => (cx, layout.ly()),
        }
    }
}

impl fmt::Display for CoreEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classifies a point to its nearest layout edge.
///
/// Computes the distance from (x, y) to each of the four boundary lines
/// and returns the closest. Equal distances resolve by the fixed priority
/// West > East > North > South: edges are evaluated in that order and only
/// a strictly smaller distance displaces the current winner.
pub fn nearest_edge(layout: &Layout, x: f64, y: f64) -> CoreEdge {
    let distances = [
        (x - layout.lx()).abs(),
        (layout.ux() - x).abs(),
        (layout.uy() - y).abs(),
        (y - layout.ly()).abs(),
    ];

    let mut best = CoreEdge::West;
    let mut best_dist = distances[0];
    for edge in &CoreEdge::ALL[1..] {
        let d = distances[edge.index()];
        if d < best_dist {
            best = *edge;
            best_dist = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_layout() -> Layout {
        Layout::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn stable_indices() {
        assert_eq!(CoreEdge::West.index(), 0);
        assert_eq!(CoreEdge::East.index(), 1);
        assert_eq!(CoreEdge::North.index(), 2);
        assert_eq!(CoreEdge::South.index(), 3);
        for (i, edge) in CoreEdge::ALL.iter().enumerate() {
            assert_eq!(CoreEdge::from_index(i), Some(*edge));
        }
        assert_eq!(CoreEdge::from_index(4), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(CoreEdge::West.to_string(), "West");
        assert_eq!(CoreEdge::South.to_string(), "South");
    }

    #[test]
    fn on_boundary_classifies_to_that_edge() {
        let layout = unit_layout();
        assert_eq!(nearest_edge(&layout, 0.0, 50.0), CoreEdge::West);
        assert_eq!(nearest_edge(&layout, 100.0, 50.0), CoreEdge::East);
        assert_eq!(nearest_edge(&layout, 50.0, 100.0), CoreEdge::North);
        assert_eq!(nearest_edge(&layout, 50.0, 0.0), CoreEdge::South);
    }

    #[test]
    fn tie_breaks_follow_fixed_priority() {
        let layout = unit_layout();
        // Center is equidistant from all four edges: West wins.
        assert_eq!(nearest_edge(&layout, 50.0, 50.0), CoreEdge::West);
        // Equidistant West/North (corner diagonal): West wins.
        assert_eq!(nearest_edge(&layout, 10.0, 90.0), CoreEdge::West);
        // Equidistant East/North: East wins.
        assert_eq!(nearest_edge(&layout, 90.0, 90.0), CoreEdge::East);
        // Equidistant West/East in a tall region: West wins.
        let tall = Layout::new(Rect::new(0.0, 0.0, 100.0, 300.0));
        assert_eq!(nearest_edge(&tall, 50.0, 150.0), CoreEdge::West);
        // Equidistant North/South in a wide region: North wins.
        let wide = Layout::new(Rect::new(0.0, 0.0, 300.0, 100.0));
        assert_eq!(nearest_edge(&wide, 150.0, 50.0), CoreEdge::North);
        // Equidistant East/South: East wins.
        assert_eq!(nearest_edge(&layout, 90.0, 10.0), CoreEdge::East);
    }

    #[test]
    fn edge_midpoints() {
        let layout = unit_layout();
        assert_eq!(CoreEdge::West.midpoint(&layout), (0.0, 50.0));
        assert_eq!(CoreEdge::East.midpoint(&layout), (100.0, 50.0));
        assert_eq!(CoreEdge::North.midpoint(&layout), (50.0, 100.0));
        assert_eq!(CoreEdge::South.midpoint(&layout), (50.0, 0.0));
    }

    #[test]
    fn child_layout_from_partition() {
        let parent = unit_layout();
        let child = Layout::from_partition(&parent, Rect::new(0.0, 0.0, 50.0, 100.0));
        assert_eq!(child.ux(), 50.0);
        assert_eq!(child.uy(), 100.0);
    }
}
