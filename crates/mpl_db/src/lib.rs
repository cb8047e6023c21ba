//! Layout database interface for the mpl macro placement toolkit.
//!
//! This crate defines the [`LayoutDb`] trait that abstracts over the
//! physical layout database holding instance geometry: the placer
//! enumerates placeable instances and chip-boundary terminals through it,
//! and writes final macro coordinates back through it at the end of a run.
//! [`MemDb`] is a plain in-memory implementation used by tests and
//! standalone runs.
//!
//! # Usage
//!
//! ```
//! use mpl_common::Rect;
//! use mpl_db::{InstRecord, LayoutDb, MemDb};
//!
//! let mut db = MemDb::new(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let ram = db.add_instance(InstRecord {
//!     name: "ram0".into(),
//!     bbox: Rect::new(10.0, 10.0, 30.0, 40.0),
//!     is_block: true,
//! });
//! db.set_instance_location(ram, 50.0, 50.0);
//! assert_eq!(db.instance(ram).bbox.lx, 50.0);
//! ```

#![warn(missing_docs)]

pub mod data;
pub mod ids;
pub mod mem;

pub use data::{InstRecord, PortDirection, TermRecord};
pub use ids::{InstId, TermId};
pub use mem::MemDb;

use mpl_common::Rect;

/// The layout database collaborator consumed by the placer.
///
/// Instances and terminals are addressed by opaque handles ([`InstId`],
/// [`TermId`]) so the placer never holds references into the database's
/// own object graph. All queries are read-only; the single mutation point
/// is [`set_instance_location`](Self::set_instance_location), used once
/// when the best placement is committed.
pub trait LayoutDb {
    /// Returns the chip core area rectangle.
    fn core_area(&self) -> Rect;

    /// Returns the handles of all instances in the database.
    fn instances(&self) -> Vec<InstId>;

    /// Returns the record for the given instance.
    fn instance(&self, id: InstId) -> &InstRecord;

    /// Returns the handles of all chip-boundary terminals.
    fn terminals(&self) -> Vec<TermId>;

    /// Returns the record for the given terminal.
    fn terminal(&self, id: TermId) -> &TermRecord;

    /// Moves the given instance so its lower-left corner is at (lx, ly).
    fn set_instance_location(&mut self, id: InstId, lx: f64, ly: f64);
}
