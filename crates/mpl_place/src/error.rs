//! Error types for the placement orchestrator.

use mpl_common::InternalError;
use mpl_config::ConfigError;

/// Errors surfaced by the placement orchestrator.
///
/// Configuration problems abort before any placement work; infeasibility
/// is reported only after every trial has been exhausted. Missing timing
/// data is not an error: it degrades the weighting engine and emits a
/// warning diagnostic instead.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// Malformed or contradictory configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The placer was used before `init` bound its collaborators.
    #[error("placer is not initialized; call init() first")]
    Uninitialized,

    /// No trial could fit all macros within the fence region.
    #[error("no feasible placement found after {trials} trials")]
    Infeasible {
        /// The number of trials that were attempted.
        trials: usize,
    },

    /// A placement invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_infeasible() {
        let err = PlaceError::Infeasible { trials: 4 };
        assert_eq!(
            format!("{err}"),
            "no feasible placement found after 4 trials"
        );
    }

    #[test]
    fn config_error_converts() {
        let cfg = ConfigError::NegativeSpacing {
            key: "halo_x".into(),
            value: -1.0,
        };
        let err: PlaceError = cfg.into();
        assert!(matches!(err, PlaceError::Config(_)));
    }

    #[test]
    fn internal_error_converts() {
        let err: PlaceError = InternalError::new("weights not computed").into();
        assert!(matches!(err, PlaceError::Internal(_)));
    }
}
