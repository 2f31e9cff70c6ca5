//! PPO and discriminator optimization hyperparameters.

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

/// Learning-rate schedule selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Adjust the learning rate to hold the KL divergence near `desired_kl`.
    Adaptive,
    Fixed,
}

/// Optimization hyperparameters for PPO with an optional AMP discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub value_loss_coef: f32,
    pub use_clipped_value_loss: bool,
    pub clip_param: f32,
    pub entropy_coef: f32,
    pub num_learning_epochs: u32,
    pub num_mini_batches: u32,
    pub learning_rate: f32,
    pub schedule: Schedule,
    /// Discount factor.
    pub gamma: f32,
    /// GAE lambda.
    pub lam: f32,
    /// Target KL for the adaptive schedule; ignored when fixed.
    pub desired_kl: Option<f32>,
    pub max_grad_norm: f32,
    /// Capacity of the discriminator's policy-transition replay buffer.
    pub amp_replay_buffer_size: usize,
    /// Weight of the discriminator prediction loss.
    pub disc_coef: f32,
    /// Weight of the action-bound penalty.
    pub bounds_loss_coef: f32,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            value_loss_coef: 1.0,
            use_clipped_value_loss: true,
            clip_param: 0.2,
            entropy_coef: 0.01,
            num_learning_epochs: 5,
            num_mini_batches: 4,
            learning_rate: 1.0e-3,
            schedule: Schedule::Adaptive,
            gamma: 0.99,
            lam: 0.95,
            desired_kl: Some(0.01),
            max_grad_norm: 1.0,
            amp_replay_buffer_size: 1_000_000,
            disc_coef: 5.0,
            bounds_loss_coef: 10.0,
        }
    }
}

impl AlgorithmConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(FatalConfigError::InvalidValue {
                field: "algorithm.gamma",
                message: format!("discount must be in [0, 1), got {}", self.gamma),
            });
        }
        if !(0.0..=1.0).contains(&self.lam) {
            return Err(FatalConfigError::InvalidValue {
                field: "algorithm.lam",
                message: format!("must be in [0, 1], got {}", self.lam),
            });
        }
        for (field, value) in [
            ("algorithm.clip_param", self.clip_param),
            ("algorithm.learning_rate", self.learning_rate),
            ("algorithm.max_grad_norm", self.max_grad_norm),
        ] {
            if value <= 0.0 {
                return Err(FatalConfigError::InvalidValue {
                    field,
                    message: format!("must be > 0, got {value}"),
                });
            }
        }
        if self.num_learning_epochs == 0 || self.num_mini_batches == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "algorithm.num_learning_epochs",
                message: "epochs and mini-batches must be at least 1".into(),
            });
        }
        if self.schedule == Schedule::Adaptive && self.desired_kl.is_none() {
            return Err(FatalConfigError::InvalidValue {
                field: "algorithm.desired_kl",
                message: "adaptive schedule requires a target KL".into(),
            });
        }
        if self.amp_replay_buffer_size == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "algorithm.amp_replay_buffer_size",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlgorithmPatch {
    pub value_loss_coef: Option<f32>,
    pub use_clipped_value_loss: Option<bool>,
    pub clip_param: Option<f32>,
    pub entropy_coef: Option<f32>,
    pub num_learning_epochs: Option<u32>,
    pub num_mini_batches: Option<u32>,
    pub learning_rate: Option<f32>,
    pub schedule: Option<Schedule>,
    pub gamma: Option<f32>,
    pub lam: Option<f32>,
    pub desired_kl: Option<f32>,
    pub max_grad_norm: Option<f32>,
    pub amp_replay_buffer_size: Option<usize>,
    pub disc_coef: Option<f32>,
    pub bounds_loss_coef: Option<f32>,
}

impl Overlay for AlgorithmConfig {
    type Patch = AlgorithmPatch;

    fn overlay(&mut self, patch: AlgorithmPatch) {
        take(&mut self.value_loss_coef, patch.value_loss_coef);
        take(&mut self.use_clipped_value_loss, patch.use_clipped_value_loss);
        take(&mut self.clip_param, patch.clip_param);
        take(&mut self.entropy_coef, patch.entropy_coef);
        take(&mut self.num_learning_epochs, patch.num_learning_epochs);
        take(&mut self.num_mini_batches, patch.num_mini_batches);
        take(&mut self.learning_rate, patch.learning_rate);
        take(&mut self.schedule, patch.schedule);
        take(&mut self.gamma, patch.gamma);
        take(&mut self.lam, patch.lam);
        if let Some(v) = patch.desired_kl {
            self.desired_kl = Some(v);
        }
        take(&mut self.max_grad_norm, patch.max_grad_norm);
        take(&mut self.amp_replay_buffer_size, patch.amp_replay_buffer_size);
        take(&mut self.disc_coef, patch.disc_coef);
        take(&mut self.bounds_loss_coef, patch.bounds_loss_coef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waddle_core::merge::merge;

    #[test]
    fn defaults_validate() {
        assert!(AlgorithmConfig::default().validate().is_ok());
    }

    #[test]
    fn gamma_of_one_rejected() {
        let cfg = AlgorithmConfig {
            gamma: 1.0,
            ..AlgorithmConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn adaptive_schedule_needs_target_kl() {
        let cfg = AlgorithmConfig {
            desired_kl: None,
            ..AlgorithmConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AlgorithmConfig {
            schedule: Schedule::Fixed,
            desired_kl: None,
            ..AlgorithmConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_entropy_coef_is_valid() {
        // Imitation recipes often drop the entropy bonus entirely.
        let cfg = AlgorithmConfig {
            entropy_coef: 0.0,
            ..AlgorithmConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn patch_overrides_optimization_knobs() {
        let patch = AlgorithmPatch {
            entropy_coef: Some(0.0),
            num_learning_epochs: Some(2),
            num_mini_batches: Some(32),
            ..AlgorithmPatch::default()
        };
        let merged = merge(AlgorithmConfig::default(), patch);
        assert!((merged.entropy_coef - 0.0).abs() < f32::EPSILON);
        assert_eq!(merged.num_learning_epochs, 2);
        assert_eq!(merged.num_mini_batches, 32);
        assert_eq!(merged.desired_kl, Some(0.01));
    }

    #[test]
    fn schedule_toml_naming() {
        let cfg: AlgorithmConfig = toml::from_str("schedule = \"fixed\"").unwrap();
        assert_eq!(cfg.schedule, Schedule::Fixed);
    }
}
