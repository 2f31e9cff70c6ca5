//! Learning-side training configuration for the waddle locomotion stack.
//!
//! Mirrors the composition model of `waddle-config`: a preset base, at most
//! one override document, one validation pass, then the result is frozen. The
//! learning side additionally cross-checks itself against the composed robot
//! variant, since per-joint vectors here must agree with the robot's joint
//! count.

pub mod algorithm;
pub mod policy;
pub mod presets;
pub mod runner;

use bevy::ecs::resource::Resource;
use serde::{Deserialize, Serialize};

use waddle_config::RobotVariantConfig;
use waddle_core::error::{ConfigError, FatalConfigError};
use waddle_core::merge::{Overlay, merge, patch_from_toml};

use crate::algorithm::{AlgorithmConfig, AlgorithmPatch};
use crate::policy::{PolicyConfig, PolicyPatch};
use crate::runner::{RunnerConfig, RunnerPatch};

/// The complete, frozen learning configuration for one training variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Resource)]
pub struct TrainingVariantConfig {
    pub name: String,
    pub policy: PolicyConfig,
    pub algorithm: AlgorithmConfig,
    pub runner: RunnerConfig,
}

impl TrainingVariantConfig {
    /// Merge an override document on top of this variant and re-validate.
    pub fn compose(self, overrides: TrainingVariantOverride) -> Result<Self, ConfigError> {
        let composed = merge(self, overrides);
        composed.validate()?;
        Ok(composed)
    }

    /// Run the learning-side structural checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.checked().map_err(|e| e.in_variant(&self.name))
    }

    fn checked(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.algorithm.validate()?;
        self.runner.validate()?;
        Ok(())
    }

    /// Cross-check against the composed robot variant.
    ///
    /// A declared per-joint std floor must have exactly one entry per actuated
    /// joint; a silent length mismatch would misalign the floor with the
    /// action vector.
    pub fn validate_against(&self, robot: &RobotVariantConfig) -> Result<(), ConfigError> {
        let floors = &self.runner.min_normalized_std;
        if !floors.is_empty() && floors.len() != robot.env.num_actions {
            return Err(ConfigError::from(FatalConfigError::PerJointVecLenMismatch {
                expected: robot.env.num_actions,
                got: floors.len(),
            })
            .in_variant(&self.name));
        }
        Ok(())
    }
}

/// A partial override document for the learning side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingVariantOverride {
    pub policy: Option<PolicyPatch>,
    pub algorithm: Option<AlgorithmPatch>,
    pub runner: Option<RunnerPatch>,
}

impl TrainingVariantOverride {
    pub fn from_toml(doc: &str) -> Result<Self, ConfigError> {
        Ok(patch_from_toml(doc)?)
    }
}

impl Overlay for TrainingVariantConfig {
    type Patch = TrainingVariantOverride;

    fn overlay(&mut self, patch: TrainingVariantOverride) {
        if let Some(p) = patch.policy {
            self.policy.overlay(p);
        }
        if let Some(p) = patch.algorithm {
            self.algorithm.overlay(p);
        }
        if let Some(p) = patch.runner {
            self.runner.overlay(p);
        }
    }
}

pub mod prelude {
    pub use crate::algorithm::{AlgorithmConfig, Schedule};
    pub use crate::policy::{Activation, PolicyConfig};
    pub use crate::runner::RunnerConfig;
    pub use crate::{TrainingVariantConfig, TrainingVariantOverride};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_merges_section_by_section() {
        let doc = r"
            [algorithm]
            entropy_coef = 0.0

            [runner]
            max_iterations = 1000
        ";
        let overrides = TrainingVariantOverride::from_toml(doc).unwrap();
        let base = TrainingVariantConfig {
            name: "t".into(),
            ..TrainingVariantConfig::default()
        };
        let composed = base.compose(overrides).unwrap();
        assert!((composed.algorithm.entropy_coef - 0.0).abs() < f32::EPSILON);
        assert_eq!(composed.runner.max_iterations, 1000);
        assert_eq!(composed.policy.actor_hidden_dims, [512, 256, 128]);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = TrainingVariantOverride::from_toml("[algorithm]\ngama = 0.99").unwrap_err();
        assert!(err.to_string().contains("gama"));
    }

    #[test]
    fn validation_errors_name_the_variant() {
        let cfg = TrainingVariantConfig {
            name: "bad_train".into(),
            algorithm: AlgorithmConfig {
                gamma: 1.5,
                ..AlgorithmConfig::default()
            },
            ..TrainingVariantConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("bad_train"));
    }

    #[test]
    fn std_floor_length_checked_against_robot() {
        let robot = waddle_config::presets::bdx_amp();
        let cfg = TrainingVariantConfig {
            name: "t".into(),
            runner: RunnerConfig {
                min_normalized_std: vec![0.02; 14],
                ..RunnerConfig::default()
            },
            ..TrainingVariantConfig::default()
        };
        let err = cfg.validate_against(&robot).unwrap_err();
        assert!(err.to_string().contains("14"));
        assert!(err.to_string().contains("15"));
    }

    #[test]
    fn empty_std_floor_skips_cross_check() {
        let robot = waddle_config::presets::bdx_amp();
        let cfg = TrainingVariantConfig::default();
        assert!(cfg.validate_against(&robot).is_ok());
    }
}
