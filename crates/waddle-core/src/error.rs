//! Configuration error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for configuration composition.
///
/// Every variant is raised during the single construction/validation pass at
/// process bootstrap; none are recoverable. [`ConfigError::in_variant`] tags
/// an error with the variant being composed so the failure message names both
/// the offending field and the variant.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("fatal config error: {0}")]
    Fatal(#[from] FatalConfigError),

    #[error("{0}")]
    MissingMotionFile(#[from] MissingMotionFileError),

    #[error("variant `{variant}`: {source}")]
    InVariant {
        variant: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Tag this error with the name of the variant being composed.
    ///
    /// Already-tagged errors are returned unchanged so nested composition
    /// steps do not stack variant prefixes.
    #[must_use]
    pub fn in_variant(self, variant: &str) -> Self {
        match self {
            Self::InVariant { .. } => self,
            other => Self::InVariant {
                variant: variant.to_owned(),
                source: Box::new(other),
            },
        }
    }
}

/// Malformed configuration input: an override document referencing a field
/// that does not exist in the base schema, unparseable TOML, or a name that
/// no external consumer registers.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown override fields surface here: override documents are
    /// deserialized with `deny_unknown_fields`, so a typo'd field name fails
    /// parsing instead of being silently dropped.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("reward term `{0}` is not registered with the reward engine")]
    UnknownRewardTerm(String),
}

/// Cross-field key-set mismatch between per-joint tables.
#[derive(Debug, Error)]
pub enum SchemaMismatchError {
    #[error("joint `{joint}` is missing from the {table} table")]
    MissingJoint { table: &'static str, joint: String },

    #[error("joint `{joint}` in the {table} table is not a declared joint")]
    UnknownJoint { table: &'static str, joint: String },

    #[error("{table} table declares {got} joints but num_actions = {expected}")]
    Cardinality {
        table: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Structurally unusable configuration. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum FatalConfigError {
    #[error("motion file set is empty: imitation cannot proceed with no reference data")]
    EmptyMotionSet,

    #[error("invalid range for {field}: lo ({lo}) > hi ({hi})")]
    InvalidRange { field: &'static str, lo: f32, hi: f32 },

    #[error("num_observations = {declared} but the declared observation layout totals {expected}")]
    ObservationDimMismatch { declared: usize, expected: usize },

    #[error(
        "num_privileged_obs = {declared} but the declared observation layout totals {expected}"
    )]
    PrivilegedDimMismatch { declared: usize, expected: usize },

    #[error("min_normalized_std has {got} entries but num_actions = {expected}")]
    PerJointVecLenMismatch { expected: usize, got: usize },

    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl FatalConfigError {
    /// Validate a `[lo, hi]` range field.
    ///
    /// Ranges are checked even when the toggle that consumes them is
    /// disabled, to catch stale configuration.
    pub fn check_range(field: &'static str, range: [f32; 2]) -> Result<(), Self> {
        let [lo, hi] = range;
        if lo > hi {
            return Err(Self::InvalidRange { field, lo, hi });
        }
        Ok(())
    }
}

/// A declared motion file path that does not resolve to an existing file.
#[derive(Debug, Error)]
#[error("motion file does not exist: {path}")]
pub struct MissingMotionFileError {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_schema_error() {
        let err = SchemaError::UnknownRewardTerm("jump_height".into());
        let config_err: ConfigError = err.into();
        assert!(matches!(config_err, ConfigError::Schema(_)));
        assert!(config_err.to_string().contains("jump_height"));
    }

    #[test]
    fn config_error_from_mismatch_error() {
        let err = SchemaMismatchError::MissingJoint {
            table: "stiffness",
            joint: "left_knee".into(),
        };
        let config_err: ConfigError = err.into();
        assert!(matches!(config_err, ConfigError::SchemaMismatch(_)));
        assert!(config_err.to_string().contains("left_knee"));
    }

    #[test]
    fn in_variant_tags_message() {
        let err: ConfigError = FatalConfigError::EmptyMotionSet.into();
        let tagged = err.in_variant("bdx_amp");
        assert!(tagged.to_string().contains("bdx_amp"));
        assert!(tagged.to_string().contains("motion file set is empty"));
    }

    #[test]
    fn in_variant_does_not_stack() {
        let err: ConfigError = FatalConfigError::EmptyMotionSet.into();
        let tagged = err.in_variant("bdx_amp").in_variant("other");
        assert!(tagged.to_string().contains("bdx_amp"));
        assert!(!tagged.to_string().contains("other"));
    }

    #[test]
    fn mismatch_display_messages() {
        assert_eq!(
            SchemaMismatchError::MissingJoint {
                table: "damping",
                joint: "head_yaw".into()
            }
            .to_string(),
            "joint `head_yaw` is missing from the damping table"
        );
        assert_eq!(
            SchemaMismatchError::Cardinality {
                table: "default_joint_angles",
                expected: 15,
                got: 14
            }
            .to_string(),
            "default_joint_angles table declares 14 joints but num_actions = 15"
        );
    }

    #[test]
    fn fatal_display_messages() {
        assert_eq!(
            FatalConfigError::InvalidRange {
                field: "commands.ranges.lin_vel_x",
                lo: 0.5,
                hi: 0.3
            }
            .to_string(),
            "invalid range for commands.ranges.lin_vel_x: lo (0.5) > hi (0.3)"
        );
        assert!(
            FatalConfigError::EmptyMotionSet
                .to_string()
                .contains("no reference data")
        );
    }

    #[test]
    fn check_range_accepts_ordered_and_degenerate() {
        assert!(FatalConfigError::check_range("x", [0.0, 1.0]).is_ok());
        assert!(FatalConfigError::check_range("x", [0.3, 0.3]).is_ok());
        assert!(FatalConfigError::check_range("x", [-1.0, -0.5]).is_ok());
    }

    #[test]
    fn check_range_rejects_inverted() {
        let err = FatalConfigError::check_range("domain_rand.friction_range", [1.2, 0.8])
            .unwrap_err();
        assert!(matches!(err, FatalConfigError::InvalidRange { .. }));
        assert!(err.to_string().contains("domain_rand.friction_range"));
    }

    #[test]
    fn missing_motion_file_names_path() {
        let err = MissingMotionFileError {
            path: PathBuf::from("datasets/bdx/walk.txt"),
        };
        assert!(err.to_string().contains("datasets/bdx/walk.txt"));
    }
}
