//! In-memory layout database.
//!
//! [`MemDb`] backs the [`LayoutDb`] trait with plain vectors. It is the
//! database used by the test suite and by standalone placement runs that
//! are not embedded in a larger physical-design flow.

use crate::data::{InstRecord, TermRecord};
use crate::ids::{InstId, TermId};
use crate::LayoutDb;
use mpl_common::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A vector-backed layout database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemDb {
    core: Rect,
    instances: Vec<InstRecord>,
    terminals: Vec<TermRecord>,
    /// Auxiliary index: instance name to handle (rebuilt on deserialization).
    #[serde(skip)]
    inst_by_name: HashMap<String, InstId>,
}

impl MemDb {
    /// Creates an empty database with the given core area.
    pub fn new(core: Rect) -> Self {
        Self {
            core,
            instances: Vec::new(),
            terminals: Vec::new(),
            inst_by_name: HashMap::new(),
        }
    }

    /// Adds an instance and returns its handle.
    pub fn add_instance(&mut self, inst: InstRecord) -> InstId {
        let id = InstId::from_raw(self.instances.len() as u32);
        self.inst_by_name.insert(inst.name.clone(), id);
        self.instances.push(inst);
        id
    }

    /// Adds a boundary terminal and returns its handle.
    pub fn add_terminal(&mut self, term: TermRecord) -> TermId {
        let id = TermId::from_raw(self.terminals.len() as u32);
        self.terminals.push(term);
        id
    }

    /// Looks up an instance handle by name.
    pub fn instance_by_name(&self, name: &str) -> Option<InstId> {
        self.inst_by_name.get(name).copied()
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.inst_by_name.clear();
        for (i, inst) in self.instances.iter().enumerate() {
            self.inst_by_name
                .insert(inst.name.clone(), InstId::from_raw(i as u32));
        }
    }
}

impl LayoutDb for MemDb {
    fn core_area(&self) -> Rect {
        self.core
    }

    fn instances(&self) -> Vec<InstId> {
        (0..self.instances.len() as u32)
            .map(InstId::from_raw)
            .collect()
    }

    fn instance(&self, id: InstId) -> &InstRecord {
        &self.instances[id.as_raw() as usize]
    }

    fn terminals(&self) -> Vec<TermId> {
        (0..self.terminals.len() as u32)
            .map(TermId::from_raw)
            .collect()
    }

    fn terminal(&self, id: TermId) -> &TermRecord {
        &self.terminals[id.as_raw() as usize]
    }

    fn set_instance_location(&mut self, id: InstId, lx: f64, ly: f64) {
        let inst = &mut self.instances[id.as_raw() as usize];
        let w = inst.bbox.width();
        let h = inst.bbox.height();
        inst.bbox = Rect::new(lx, ly, lx + w, ly + h);
    }
}
