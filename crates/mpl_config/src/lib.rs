//! Parsing and validation of macro placement configuration files.
//!
//! Two logical configuration sources feed the placer: the *global* config
//! (chip-wide halo/channel defaults and an optional fence region) and the
//! *local* config (per-macro-name overrides of halo and channel). Both are
//! TOML files deserialized into strongly-typed structs and validated before
//! any placement work begins.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_global_config, load_global_config_from_str, load_local_config,
    load_local_config_from_str, validate_global, validate_local,
};
pub use types::{FenceConfig, GlobalConfig, LocalConfig, MacroOverride};
