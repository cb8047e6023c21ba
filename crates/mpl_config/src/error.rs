//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating placement configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A halo or channel value is negative.
    #[error("negative spacing for {key}: {value}")]
    NegativeSpacing {
        /// The offending key, e.g. `halo_x` or `macros.ram0.channel_y`.
        key: String,
        /// The rejected value.
        value: f64,
    },

    /// The fence rectangle has ux < lx or uy < ly.
    #[error("invalid fence region: ({lx}, {ly}) - ({ux}, {uy})")]
    InvalidFence {
        /// Fence lower-left x.
        lx: f64,
        /// Fence lower-left y.
        ly: f64,
        /// Fence upper-right x.
        ux: f64,
        /// Fence upper-right y.
        uy: f64,
    },
}
