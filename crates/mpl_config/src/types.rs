//! Configuration types deserialized from placement config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The chip-wide placement configuration.
///
/// Supplies the default keep-out halo and routing channel margins applied
/// to every macro that has no local override, and the optional fence
/// region confining placement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default keep-out margin in x applied around each macro.
    #[serde(default)]
    pub halo_x: f64,
    /// Default keep-out margin in y applied around each macro.
    #[serde(default)]
    pub halo_y: f64,
    /// Default routing channel margin in x reserved next to each macro.
    #[serde(default)]
    pub channel_x: f64,
    /// Default routing channel margin in y reserved next to each macro.
    #[serde(default)]
    pub channel_y: f64,
    /// Optional fence region; when absent the core area is used.
    #[serde(default)]
    pub fence: Option<FenceConfig>,
    /// Verbosity level for placement reporting (0 = quiet).
    #[serde(default)]
    pub verbose: u32,
}

/// The rectangular fence region within which macros must be placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FenceConfig {
    /// Fence lower-left x.
    pub lx: f64,
    /// Fence lower-left y.
    pub ly: f64,
    /// Fence upper-right x.
    pub ux: f64,
    /// Fence upper-right y.
    pub uy: f64,
}

/// Per-macro-name overrides of halo and channel spacing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Override entries keyed by macro instance name.
    #[serde(default)]
    pub macros: BTreeMap<String, MacroOverride>,
}

/// An override bundle for a single macro.
///
/// Absent fields fall back to the global defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MacroOverride {
    /// Override for the keep-out margin in x.
    #[serde(default)]
    pub halo_x: Option<f64>,
    /// Override for the keep-out margin in y.
    #[serde(default)]
    pub halo_y: Option<f64>,
    /// Override for the routing channel margin in x.
    #[serde(default)]
    pub channel_x: Option<f64>,
    /// Override for the routing channel margin in y.
    #[serde(default)]
    pub channel_y: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_defaults() {
        let cfg = GlobalConfig::default();
        assert_eq!(cfg.halo_x, 0.0);
        assert_eq!(cfg.channel_y, 0.0);
        assert!(cfg.fence.is_none());
        assert_eq!(cfg.verbose, 0);
    }

    #[test]
    fn override_defaults() {
        let ov = MacroOverride::default();
        assert!(ov.halo_x.is_none());
        assert!(ov.channel_x.is_none());
    }

    #[test]
    fn global_serde_roundtrip() {
        let cfg = GlobalConfig {
            halo_x: 2.0,
            halo_y: 2.0,
            channel_x: 1.0,
            channel_y: 1.5,
            fence: Some(FenceConfig {
                lx: 0.0,
                ly: 0.0,
                ux: 100.0,
                uy: 80.0,
            }),
            verbose: 1,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GlobalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.halo_x, 2.0);
        assert_eq!(back.fence.unwrap().ux, 100.0);
    }
}
