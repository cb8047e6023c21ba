//! Record types exposed by the layout database.

use mpl_common::Rect;
use serde::{Deserialize, Serialize};

/// The direction of a pin or boundary terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Signal flows into the core.
    Input,
    /// Signal flows out of the core.
    Output,
    /// Bidirectional signal.
    InOut,
}

/// A placed instance in the layout database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstRecord {
    /// The hierarchical instance name.
    pub name: String,
    /// The placed footprint (lower-left corner plus extent).
    pub bbox: Rect,
    /// Whether this instance is a macro block (as opposed to a standard cell).
    pub is_block: bool,
}

impl InstRecord {
    /// Returns the width of the instance footprint.
    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    /// Returns the height of the instance footprint.
    pub fn height(&self) -> f64 {
        self.bbox.height()
    }
}

/// A chip-boundary terminal (top-level pin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRecord {
    /// The terminal name.
    pub name: String,
    /// The terminal x location.
    pub x: f64,
    /// The terminal y location.
    pub y: f64,
    /// The signal direction seen from the core.
    pub direction: PortDirection,
}
