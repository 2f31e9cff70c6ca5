//! Actor-critic network shape declarations.

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

/// Hidden-layer activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Elu,
    Relu,
    Selu,
    Tanh,
}

/// Actor-critic architecture declaration, consumed by the external learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Initial standard deviation of the action distribution.
    pub init_noise_std: f32,
    pub actor_hidden_dims: Vec<usize>,
    pub critic_hidden_dims: Vec<usize>,
    pub activation: Activation,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            init_noise_std: 1.0,
            actor_hidden_dims: vec![512, 256, 128],
            critic_hidden_dims: vec![512, 256, 128],
            activation: Activation::Elu,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.init_noise_std <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "policy.init_noise_std",
                message: format!("must be > 0, got {}", self.init_noise_std),
            });
        }
        for (field, dims) in [
            ("policy.actor_hidden_dims", &self.actor_hidden_dims),
            ("policy.critic_hidden_dims", &self.critic_hidden_dims),
        ] {
            if dims.is_empty() || dims.contains(&0) {
                return Err(FatalConfigError::InvalidValue {
                    field,
                    message: "layer widths must be non-empty and positive".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyPatch {
    pub init_noise_std: Option<f32>,
    pub actor_hidden_dims: Option<Vec<usize>>,
    pub critic_hidden_dims: Option<Vec<usize>>,
    pub activation: Option<Activation>,
}

impl Overlay for PolicyConfig {
    type Patch = PolicyPatch;

    fn overlay(&mut self, patch: PolicyPatch) {
        take(&mut self.init_noise_std, patch.init_noise_std);
        // Layer lists replace wholesale; widths are not spliced per index.
        take(&mut self.actor_hidden_dims, patch.actor_hidden_dims);
        take(&mut self.critic_hidden_dims, patch.critic_hidden_dims);
        take(&mut self.activation, patch.activation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waddle_core::merge::merge;

    #[test]
    fn defaults_validate() {
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_hidden_dims_rejected() {
        let cfg = PolicyConfig {
            actor_hidden_dims: vec![],
            ..PolicyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_width_layer_rejected() {
        let cfg = PolicyConfig {
            critic_hidden_dims: vec![512, 0],
            ..PolicyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn hidden_dims_replace_wholesale() {
        let patch = PolicyPatch {
            actor_hidden_dims: Some(vec![1024, 512]),
            activation: Some(Activation::Relu),
            ..PolicyPatch::default()
        };
        let merged = merge(PolicyConfig::default(), patch);
        assert_eq!(merged.actor_hidden_dims, [1024, 512]);
        assert_eq!(merged.activation, Activation::Relu);
        // Critic keeps the base shape.
        assert_eq!(merged.critic_hidden_dims, [512, 256, 128]);
    }

    #[test]
    fn activation_toml_naming() {
        let cfg: PolicyConfig = toml::from_str("activation = \"relu\"").unwrap();
        assert_eq!(cfg.activation, Activation::Relu);
    }
}
