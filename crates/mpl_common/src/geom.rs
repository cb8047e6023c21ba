//! Axis-aligned rectangle geometry.
//!
//! [`Rect`] is the single geometric primitive shared by the layout database,
//! the spatial partitioner, and the placement orchestrator. Coordinates are
//! in database units (microns) with the origin at the chip's lower-left.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Lower-left x coordinate.
    pub lx: f64,
    /// Lower-left y coordinate.
    pub ly: f64,
    /// Upper-right x coordinate.
    pub ux: f64,
    /// Upper-right y coordinate.
    pub uy: f64,
}

impl Rect {
    /// Creates a rectangle from its lower-left and upper-right corners.
    pub fn new(lx: f64, ly: f64, ux: f64, uy: f64) -> Self {
        Self { lx, ly, ux, uy }
    }

    /// Returns the width of the rectangle.
    pub fn width(&self) -> f64 {
        self.ux - self.lx
    }

    /// Returns the height of the rectangle.
    pub fn height(&self) -> f64 {
        self.uy - self.ly
    }

    /// Returns the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        ((self.lx + self.ux) / 2.0, (self.ly + self.uy) / 2.0)
    }

    /// Returns whether the corners are properly ordered (ux ≥ lx, uy ≥ ly).
    pub fn is_valid(&self) -> bool {
        self.ux >= self.lx && self.uy >= self.ly
    }

    /// Returns whether the point (x, y) lies inside or on the boundary.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.lx && x <= self.ux && y >= self.ly && y <= self.uy
    }

    /// Returns whether `other` lies entirely inside or on the boundary.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.lx >= self.lx && other.ux <= self.ux && other.ly >= self.ly && other.uy <= self.uy
    }
}
