//! Macro records and macro-list construction.
//!
//! A [`Macro`] is the placer's record for one placeable block: geometry
//! taken from its database instance plus resolved halo and routing channel
//! margins. Macros are created once per block instance when the list is
//! built and mutated only by coordinate updates during placement.

use mpl_config::{GlobalConfig, LocalConfig, MacroOverride};
use mpl_db::{InstId, LayoutDb};
use mpl_partition::MacroFootprint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A placeable macro block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macro {
    /// Lower-left x of the block.
    pub lx: f64,
    /// Lower-left y of the block.
    pub ly: f64,
    /// Block width.
    pub w: f64,
    /// Block height.
    pub h: f64,
    /// Keep-out margin in x.
    pub halo_x: f64,
    /// Keep-out margin in y.
    pub halo_y: f64,
    /// Routing channel margin in x.
    pub channel_x: f64,
    /// Routing channel margin in y.
    pub channel_y: f64,
    /// Stable handle of the originating database instance.
    pub inst: InstId,
    /// Instance name, cached from the database record.
    pub name: String,
}

impl Macro {
    /// Returns the center of the block at its current coordinates.
    pub fn center(&self) -> (f64, f64) {
        (self.lx + self.w / 2.0, self.ly + self.h / 2.0)
    }

    /// Returns the geometric requirements handed to the partitioner.
    pub fn footprint(&self) -> MacroFootprint {
        MacroFootprint {
            width: self.w,
            height: self.h,
            halo_x: self.halo_x,
            halo_y: self.halo_y,
            channel_x: self.channel_x,
            channel_y: self.channel_y,
        }
    }
}

/// Resolved per-macro spacing overrides, keyed by macro name.
///
/// Built from the local configuration; absent fields fall back to the
/// global defaults at macro-list construction. Read-only afterward.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacroLocalInfo {
    /// Override for the keep-out margin in x.
    pub halo_x: Option<f64>,
    /// Override for the keep-out margin in y.
    pub halo_y: Option<f64>,
    /// Override for the routing channel margin in x.
    pub channel_x: Option<f64>,
    /// Override for the routing channel margin in y.
    pub channel_y: Option<f64>,
}

impl From<&MacroOverride> for MacroLocalInfo {
    fn from(ov: &MacroOverride) -> Self {
        Self {
            halo_x: ov.halo_x,
            halo_y: ov.halo_y,
            channel_x: ov.channel_x,
            channel_y: ov.channel_y,
        }
    }
}

/// Builds the macro list from the database and resolved configuration.
///
/// Produces one [`Macro`] per block instance, with halo and channel taken
/// from the local override when one exists for the instance's name and
/// from the global defaults otherwise. Also returns the index from
/// instance handle to macro-list position used throughout the run.
///
/// Configuration values are validated before this is called; the inputs
/// here are assumed well-formed.
pub fn build_macro_list(
    db: &dyn LayoutDb,
    global: &GlobalConfig,
    local: &LocalConfig,
) -> (Vec<Macro>, HashMap<InstId, usize>) {
    let local_map: HashMap<&str, MacroLocalInfo> = local
        .macros
        .iter()
        .map(|(name, ov)| (name.as_str(), MacroLocalInfo::from(ov)))
        .collect();

    let mut macros = Vec::new();
    let mut macro_inst_map = HashMap::new();

    for inst_id in db.instances() {
        let inst = db.instance(inst_id);
        if !inst.is_block {
            continue;
        }
        let ov = local_map.get(inst.name.as_str()).copied().unwrap_or_default();
        let index = macros.len();
        macros.push(Macro {
            lx: inst.bbox.lx,
            ly: inst.bbox.ly,
            w: inst.width(),
            h: inst.height(),
            halo_x: ov.halo_x.unwrap_or(global.halo_x),
            halo_y: ov.halo_y.unwrap_or(global.halo_y),
            channel_x: ov.channel_x.unwrap_or(global.channel_x),
            channel_y: ov.channel_y.unwrap_or(global.channel_y),
            inst: inst_id,
            name: inst.name.clone(),
        });
        macro_inst_map.insert(inst_id, index);
    }

    (macros, macro_inst_map)
}
