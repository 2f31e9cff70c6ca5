//! Rollout collection, checkpointing, and AMP discriminator wiring.

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

/// Training-loop and discriminator parameters consumed by the external runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Registered name of the actor-critic implementation.
    pub policy_class_name: String,
    /// Registered name of the optimization algorithm.
    pub algorithm_class_name: String,
    /// Registered name of the rollout runner.
    pub runner_class_name: String,
    /// Control steps collected per environment per iteration.
    pub num_steps_per_env: u32,
    pub max_iterations: u32,
    /// Checkpoint every this many iterations.
    pub save_interval: u32,
    /// Run directory group; individual runs get timestamped names below it.
    pub experiment_name: String,
    pub run_name: String,
    pub resume: bool,
    /// Run directory to resume from; `None` picks the most recent run under
    /// the experiment. Only read when `resume` is set.
    pub load_run: Option<String>,
    /// Checkpoint iteration to resume from; `None` picks the latest saved.
    pub checkpoint: Option<u32>,

    /// Blend of style reward and task reward: `lerp * task + (1 - lerp) * style`.
    pub amp_task_reward_lerp: f32,
    /// Scale applied to the discriminator's style reward.
    pub amp_reward_coef: f32,
    /// Expert transitions loaded from the motion set before training starts.
    pub amp_num_preload_transitions: usize,
    /// Discriminator MLP hidden widths.
    pub amp_discr_hidden_dims: Vec<usize>,
    /// Gradient penalty weight on the discriminator.
    pub disc_grad_penalty: f32,
    /// Per-joint floor on the normalized action std, preventing premature
    /// exploration collapse. Empty means no floor; otherwise one entry per
    /// actuated joint.
    pub min_normalized_std: Vec<f32>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            policy_class_name: "ActorCritic".into(),
            algorithm_class_name: "PPO".into(),
            runner_class_name: "OnPolicyRunner".into(),
            num_steps_per_env: 24,
            max_iterations: 1500,
            save_interval: 50,
            experiment_name: "waddle".into(),
            run_name: String::new(),
            resume: false,
            load_run: None,
            checkpoint: None,
            amp_task_reward_lerp: 0.2,
            amp_reward_coef: 2.0,
            amp_num_preload_transitions: 2_000_000,
            amp_discr_hidden_dims: vec![1024, 512],
            disc_grad_penalty: 0.001,
            min_normalized_std: Vec::new(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.num_steps_per_env == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "runner.num_steps_per_env",
                message: "must be at least 1".into(),
            });
        }
        if self.save_interval == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "runner.save_interval",
                message: "must be at least 1".into(),
            });
        }
        if self.experiment_name.is_empty() {
            return Err(FatalConfigError::InvalidValue {
                field: "runner.experiment_name",
                message: "must not be empty; it names the run directory".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.amp_task_reward_lerp) {
            return Err(FatalConfigError::InvalidValue {
                field: "runner.amp_task_reward_lerp",
                message: format!("blend must be in [0, 1], got {}", self.amp_task_reward_lerp),
            });
        }
        if self.amp_discr_hidden_dims.is_empty() || self.amp_discr_hidden_dims.contains(&0) {
            return Err(FatalConfigError::InvalidValue {
                field: "runner.amp_discr_hidden_dims",
                message: "layer widths must be non-empty and positive".into(),
            });
        }
        for &floor in &self.min_normalized_std {
            if floor < 0.0 {
                return Err(FatalConfigError::InvalidValue {
                    field: "runner.min_normalized_std",
                    message: format!("std floors must be >= 0, got {floor}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerPatch {
    pub policy_class_name: Option<String>,
    pub algorithm_class_name: Option<String>,
    pub runner_class_name: Option<String>,
    pub num_steps_per_env: Option<u32>,
    pub max_iterations: Option<u32>,
    pub save_interval: Option<u32>,
    pub experiment_name: Option<String>,
    pub run_name: Option<String>,
    pub resume: Option<bool>,
    pub load_run: Option<String>,
    pub checkpoint: Option<u32>,
    pub amp_task_reward_lerp: Option<f32>,
    pub amp_reward_coef: Option<f32>,
    pub amp_num_preload_transitions: Option<usize>,
    pub amp_discr_hidden_dims: Option<Vec<usize>>,
    pub disc_grad_penalty: Option<f32>,
    pub min_normalized_std: Option<Vec<f32>>,
}

impl Overlay for RunnerConfig {
    type Patch = RunnerPatch;

    fn overlay(&mut self, patch: RunnerPatch) {
        take(&mut self.policy_class_name, patch.policy_class_name);
        take(&mut self.algorithm_class_name, patch.algorithm_class_name);
        take(&mut self.runner_class_name, patch.runner_class_name);
        take(&mut self.num_steps_per_env, patch.num_steps_per_env);
        take(&mut self.max_iterations, patch.max_iterations);
        take(&mut self.save_interval, patch.save_interval);
        take(&mut self.experiment_name, patch.experiment_name);
        take(&mut self.run_name, patch.run_name);
        take(&mut self.resume, patch.resume);
        // Resume targets can be pointed by an override, never cleared by one;
        // falling back to the latest run is the base behavior.
        if let Some(v) = patch.load_run {
            self.load_run = Some(v);
        }
        if let Some(v) = patch.checkpoint {
            self.checkpoint = Some(v);
        }
        take(&mut self.amp_task_reward_lerp, patch.amp_task_reward_lerp);
        take(&mut self.amp_reward_coef, patch.amp_reward_coef);
        take(
            &mut self.amp_num_preload_transitions,
            patch.amp_num_preload_transitions,
        );
        take(&mut self.amp_discr_hidden_dims, patch.amp_discr_hidden_dims);
        take(&mut self.disc_grad_penalty, patch.disc_grad_penalty);
        take(&mut self.min_normalized_std, patch.min_normalized_std);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waddle_core::merge::merge;

    #[test]
    fn defaults_validate() {
        assert!(RunnerConfig::default().validate().is_ok());
    }

    #[test]
    fn reward_blend_outside_unit_interval_rejected() {
        let cfg = RunnerConfig {
            amp_task_reward_lerp: 1.5,
            ..RunnerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_experiment_name_rejected() {
        let cfg = RunnerConfig {
            experiment_name: String::new(),
            ..RunnerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_std_floor_rejected() {
        let cfg = RunnerConfig {
            min_normalized_std: vec![0.02, -0.02],
            ..RunnerConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn fresh_run_has_no_resume_target() {
        let cfg = RunnerConfig::default();
        assert!(!cfg.resume);
        assert_eq!(cfg.load_run, None);
        assert_eq!(cfg.checkpoint, None);
    }

    #[test]
    fn patch_points_resume_at_a_run_and_checkpoint() {
        let patch = RunnerPatch {
            resume: Some(true),
            load_run: Some("Aug29_14-03-11_".into()),
            checkpoint: Some(4200),
            ..RunnerPatch::default()
        };
        let merged = merge(RunnerConfig::default(), patch);
        assert!(merged.resume);
        assert_eq!(merged.load_run.as_deref(), Some("Aug29_14-03-11_"));
        assert_eq!(merged.checkpoint, Some(4200));
    }

    #[test]
    fn patch_switches_runner_classes() {
        let patch = RunnerPatch {
            algorithm_class_name: Some("AMPPPO".into()),
            runner_class_name: Some("AMPOnPolicyRunner".into()),
            max_iterations: Some(500_000),
            ..RunnerPatch::default()
        };
        let merged = merge(RunnerConfig::default(), patch);
        assert_eq!(merged.algorithm_class_name, "AMPPPO");
        assert_eq!(merged.runner_class_name, "AMPOnPolicyRunner");
        assert_eq!(merged.max_iterations, 500_000);
        assert_eq!(merged.policy_class_name, "ActorCritic");
    }
}
