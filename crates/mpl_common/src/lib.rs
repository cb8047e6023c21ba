//! Shared foundational types for the mpl macro placement toolkit.
//!
//! This crate provides the axis-aligned rectangle used throughout the
//! placement pipeline and the common result types for internal errors.

#![warn(missing_docs)]

pub mod geom;
pub mod result;

pub use geom::Rect;
pub use result::{InternalError, MplResult};
