//! Parameter range checks.
//!
//! Every value must be finite. On top of that:
//!
//! | Parameter | Constraint |
//! |-----------|------------|
//! | ratio | > 20 |
//! | knee width | ≥ 0 dB |
//! | attack | ≥ 0 s |
//! | release | ≥ 0.025 s |
//! | compression | ≥ 0 dB |
//! | drive | 0 to 1 |
//! | window | 0 to 59 s |
//!
//! # Example
//!
//! ```rust
//! use ripple_config::{validate_compressor, ValidationError};
//! use ripple_effects::CompressorParams;
//!
//! let params = CompressorParams { ratio: 4.0, ..CompressorParams::default() };
//! assert!(matches!(
//!     validate_compressor(&params),
//!     Err(ValidationError::OutOfRange { param: "ratio", .. })
//! ));
//! ```

use ripple_effects::{CompressorParams, OverdriveParams};
use thiserror::Error;

use crate::chain::{ChainPosition, EffectKind};

/// Smallest accepted compression ratio (exclusive).
pub const MIN_RATIO: f32 = 20.0;
/// Shortest accepted release time in seconds.
pub const MIN_RELEASE_S: f32 = 0.025;
/// Longest accepted overdrive window in seconds.
pub const MAX_WINDOW_S: f32 = 59.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range (must be {constraint})")]
    OutOfRange {
        /// Name of the parameter.
        param: &'static str,
        /// The rejected value.
        value: f32,
        /// Human readable constraint.
        constraint: &'static str,
    },

    /// Parameter is NaN or infinite.
    #[error("parameter '{param}' must be finite, got {value}")]
    NotFinite {
        /// Name of the parameter.
        param: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The same effect was named twice.
    #[error("{0} can only be set once in the chain")]
    DuplicateEffect(EffectKind),

    /// Both effects claim one chain position.
    #[error("both effects are set to the {0} position")]
    DuplicatePosition(ChainPosition),

    /// An effect is second with nothing first.
    #[error("{0} is second in the chain but no effect is first")]
    MissingFirst(EffectKind),

    /// More effects named than the chain holds.
    #[error("at most {max} effects can be chained, got {count}")]
    TooManyStages {
        /// Number of effects requested.
        count: usize,
        /// Chain capacity.
        max: usize,
    },

    /// Unknown effect type.
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    /// Interface setting rejected.
    #[error("invalid session setting '{param}': {reason}")]
    InvalidSession {
        /// Name of the setting.
        param: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn finite(param: &'static str, value: f32) -> ValidationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { param, value })
    }
}

fn require(
    param: &'static str,
    value: f32,
    ok: bool,
    constraint: &'static str,
) -> ValidationResult<()> {
    finite(param, value)?;
    if ok {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param,
            value,
            constraint,
        })
    }
}

/// Check compressor parameters, reporting the first violation.
pub fn validate_compressor(params: &CompressorParams) -> ValidationResult<()> {
    require("ratio", params.ratio, params.ratio > MIN_RATIO, "more than 20")?;
    require(
        "knee_width",
        params.knee_width_db,
        params.knee_width_db >= 0.0,
        "at least 0 dB",
    )?;
    finite("threshold", params.threshold_db)?;
    require("attack", params.attack_s, params.attack_s >= 0.0, "at least 0 s")?;
    require(
        "release",
        params.release_s,
        params.release_s >= MIN_RELEASE_S,
        "at least 0.025 s",
    )?;
    require(
        "compression",
        params.compression_db,
        params.compression_db >= 0.0,
        "at least 0 dB",
    )?;
    finite("comp_gain", params.gain_db)
}

/// Check overdrive parameters, reporting the first violation.
pub fn validate_overdrive(params: &OverdriveParams) -> ValidationResult<()> {
    require(
        "drive",
        params.drive,
        (0.0..=1.0).contains(&params.drive),
        "in the range 0 to 1",
    )?;
    require(
        "window",
        params.window_s,
        (0.0..=MAX_WINDOW_S).contains(&params.window_s),
        "in the range 0 to 59 s",
    )?;
    finite("drive_gain", params.gain_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_compressor(&CompressorParams::default()).is_ok());
        assert!(validate_overdrive(&OverdriveParams::default()).is_ok());
    }

    #[test]
    fn test_ratio_must_exceed_twenty() {
        let params = CompressorParams {
            ratio: 20.0,
            ..CompressorParams::default()
        };
        assert_eq!(
            validate_compressor(&params),
            Err(ValidationError::OutOfRange {
                param: "ratio",
                value: 20.0,
                constraint: "more than 20",
            })
        );
    }

    #[test]
    fn test_release_floor() {
        let ok = CompressorParams {
            release_s: 0.025,
            ..CompressorParams::default()
        };
        assert!(validate_compressor(&ok).is_ok());

        let short = CompressorParams {
            release_s: 0.02,
            ..CompressorParams::default()
        };
        assert!(matches!(
            validate_compressor(&short),
            Err(ValidationError::OutOfRange { param: "release", .. })
        ));
    }

    #[test]
    fn test_negative_values_rejected() {
        for (name, params) in [
            (
                "knee_width",
                CompressorParams {
                    knee_width_db: -1.0,
                    ..CompressorParams::default()
                },
            ),
            (
                "attack",
                CompressorParams {
                    attack_s: -0.001,
                    ..CompressorParams::default()
                },
            ),
            (
                "compression",
                CompressorParams {
                    compression_db: -3.0,
                    ..CompressorParams::default()
                },
            ),
        ] {
            match validate_compressor(&params) {
                Err(ValidationError::OutOfRange { param, .. }) => assert_eq!(param, name),
                other => panic!("expected {name} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let params = CompressorParams {
            threshold_db: f32::NAN,
            ..CompressorParams::default()
        };
        assert!(matches!(
            validate_compressor(&params),
            Err(ValidationError::NotFinite { param: "threshold", .. })
        ));

        let params = OverdriveParams {
            gain_db: f32::INFINITY,
            ..OverdriveParams::default()
        };
        assert!(matches!(
            validate_overdrive(&params),
            Err(ValidationError::NotFinite { param: "drive_gain", .. })
        ));
    }

    #[test]
    fn test_drive_range() {
        for drive in [0.0, 1.0] {
            let params = OverdriveParams {
                drive,
                ..OverdriveParams::default()
            };
            assert!(validate_overdrive(&params).is_ok());
        }
        for drive in [-0.1, 1.1] {
            let params = OverdriveParams {
                drive,
                ..OverdriveParams::default()
            };
            assert!(validate_overdrive(&params).is_err());
        }
    }

    #[test]
    fn test_window_range() {
        let params = OverdriveParams {
            window_s: 59.5,
            ..OverdriveParams::default()
        };
        assert!(matches!(
            validate_overdrive(&params),
            Err(ValidationError::OutOfRange { param: "window", .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::DuplicateEffect(EffectKind::Overdrive);
        assert_eq!(err.to_string(), "overdrive can only be set once in the chain");
    }
}
