//! Built-in learning presets, paired with the robot variants of
//! `waddle_config::presets`.

use crate::TrainingVariantConfig;
use crate::algorithm::AlgorithmConfig;
use crate::policy::{Activation, PolicyConfig};
use crate::runner::RunnerConfig;

/// Look up the learning preset paired with a robot variant.
#[must_use]
pub fn training_variant(name: &str) -> Option<TrainingVariantConfig> {
    match name {
        "bdx_amp" => Some(bdx_amp()),
        "bdx_amp_rma" => Some(bdx_amp_rma()),
        _ => None,
    }
}

fn bdx_base() -> TrainingVariantConfig {
    TrainingVariantConfig {
        name: "bdx_amp".into(),
        policy: PolicyConfig {
            init_noise_std: 1.0,
            actor_hidden_dims: vec![1024, 512],
            critic_hidden_dims: vec![1024, 512],
            activation: Activation::Relu,
        },
        algorithm: AlgorithmConfig {
            // Imitation recipe: no entropy bonus, short epochs, many small
            // mini-batches to keep the discriminator and policy in step.
            entropy_coef: 0.0,
            num_learning_epochs: 2,
            num_mini_batches: 32,
            ..AlgorithmConfig::default()
        },
        runner: RunnerConfig {
            algorithm_class_name: "AMPPPO".into(),
            runner_class_name: "AMPOnPolicyRunner".into(),
            max_iterations: 500_000,
            save_interval: 100,
            experiment_name: "bdx_amp".into(),
            min_normalized_std: vec![0.02; 15],
            ..RunnerConfig::default()
        },
    }
}

/// Learning preset for the single-motion imitation variant.
#[must_use]
pub fn bdx_amp() -> TrainingVariantConfig {
    bdx_base()
}

/// Learning preset for the adaptation-module variant.
#[must_use]
pub fn bdx_amp_rma() -> TrainingVariantConfig {
    let mut cfg = bdx_base();
    cfg.name = "bdx_amp_rma".into();
    cfg.runner.experiment_name = "bdx_amp_rma".into();
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use waddle_config::presets;

    #[test]
    fn every_learning_preset_validates() {
        for name in presets::VARIANT_NAMES {
            let cfg = training_variant(name).unwrap();
            assert_eq!(cfg.name, name);
            cfg.validate().unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn learning_presets_agree_with_their_robots() {
        for name in presets::VARIANT_NAMES {
            let robot = presets::variant(name).unwrap();
            let train = training_variant(name).unwrap();
            train
                .validate_against(&robot)
                .unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(training_variant("go2_amp").is_none());
    }

    #[test]
    fn bdx_uses_amp_runner_classes() {
        let cfg = bdx_amp();
        assert_eq!(cfg.runner.algorithm_class_name, "AMPPPO");
        assert_eq!(cfg.runner.runner_class_name, "AMPOnPolicyRunner");
        assert_eq!(cfg.runner.policy_class_name, "ActorCritic");
    }

    #[test]
    fn bdx_std_floor_covers_all_joints() {
        assert_eq!(bdx_amp().runner.min_normalized_std.len(), 15);
    }
}
