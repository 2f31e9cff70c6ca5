//! Reward-term weight declarations.
//!
//! The external reward engine evaluates every registered term each step and
//! multiplies it by the declared weight; a zero weight still computes the
//! term (logging parity) but contributes nothing. Negative weights are
//! penalties. An unregistered name in the table is a load-time error;
//! registered terms missing from the table default to zero, with a warning
//! emitted during the validation pass at load.

use std::collections::BTreeMap;

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use waddle_core::error::{FatalConfigError, SchemaError};
use waddle_core::merge::{Overlay, take};

/// Reward terms registered with the external reward engine. Keys of
/// [`RewardScales`] must come from this list.
pub const REGISTERED_TERMS: &[&str] = &[
    "termination",
    "tracking_lin_vel",
    "tracking_ang_vel",
    "lin_vel_z",
    "ang_vel_xy",
    "orientation",
    "torques",
    "dof_vel",
    "dof_acc",
    "base_height",
    "feet_air_time",
    "collision",
    "feet_stumble",
    "action_rate",
    "stand_still",
    "dof_pos_limits",
];

// ---------------------------------------------------------------------------
// RewardScales
// ---------------------------------------------------------------------------

/// Flat reward-term name → scalar weight table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardScales(pub BTreeMap<String, f32>);

impl RewardScales {
    pub fn from_entries(entries: &[(&str, f32)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(name, w)| ((*name).to_owned(), *w))
                .collect(),
        )
    }

    /// Reject any weight whose name the reward engine does not register.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for name in self.0.keys() {
            if !REGISTERED_TERMS.contains(&name.as_str()) {
                return Err(SchemaError::UnknownRewardTerm(name.clone()));
            }
        }
        Ok(())
    }

    /// Registered terms absent from the declaration.
    fn missing_terms(&self) -> impl Iterator<Item = &'static str> + '_ {
        REGISTERED_TERMS
            .iter()
            .copied()
            .filter(|term| !self.0.contains_key(*term))
    }

    /// The full weight table over every registered term.
    ///
    /// Registered terms absent from the declaration default to 0.0; those
    /// omissions were already reported when the table was validated.
    #[must_use]
    pub fn resolved(&self) -> BTreeMap<String, f32> {
        REGISTERED_TERMS
            .iter()
            .map(|&term| (term.to_owned(), self.0.get(term).copied().unwrap_or(0.0)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// RewardsConfig
// ---------------------------------------------------------------------------

/// Reward shaping parameters and the weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    pub scales: RewardScales,
    /// Clip the total reward at zero instead of going negative.
    pub only_positive_rewards: bool,
    /// Width of the velocity-tracking reward kernel.
    pub tracking_sigma: f32,
    /// Fraction of the joint position limit where the limit penalty starts.
    pub soft_dof_pos_limit: f32,
    pub soft_dof_vel_limit: f32,
    pub soft_torque_limit: f32,
    /// Target base height [m] for the base-height term.
    pub base_height_target: f32,
    /// Contact forces above this [N] are penalized.
    pub max_contact_force: f32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            scales: RewardScales::from_entries(&[
                ("termination", -0.0),
                ("tracking_lin_vel", 1.0),
                ("tracking_ang_vel", 0.5),
                ("lin_vel_z", -2.0),
                ("ang_vel_xy", -0.05),
                ("torques", -0.00001),
                ("dof_acc", -2.5e-7),
                ("feet_air_time", 1.0),
                ("collision", -1.0),
                ("action_rate", -0.01),
            ]),
            only_positive_rewards: true,
            tracking_sigma: 0.25,
            soft_dof_pos_limit: 1.0,
            soft_dof_vel_limit: 1.0,
            soft_torque_limit: 1.0,
            base_height_target: 1.0,
            max_contact_force: 100.0,
        }
    }
}

impl RewardsConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        self.scales
            .validate()
            .map_err(|e| FatalConfigError::InvalidValue {
                field: "rewards.scales",
                message: e.to_string(),
            })?;
        // Silently dropped terms are a common source of reward
        // mis-configuration; report them here, at load, not at first use.
        for term in self.scales.missing_terms() {
            warn!("reward term `{term}` not declared; defaulting its weight to 0");
        }
        if self.tracking_sigma <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "rewards.tracking_sigma",
                message: format!("must be > 0, got {}", self.tracking_sigma),
            });
        }
        for (field, value) in [
            ("rewards.soft_dof_pos_limit", self.soft_dof_pos_limit),
            ("rewards.soft_dof_vel_limit", self.soft_dof_vel_limit),
            ("rewards.soft_torque_limit", self.soft_torque_limit),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FatalConfigError::InvalidValue {
                    field,
                    message: format!("soft limits are fractions in [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewardsPatch {
    pub scales: Option<RewardScales>,
    pub only_positive_rewards: Option<bool>,
    pub tracking_sigma: Option<f32>,
    pub soft_dof_pos_limit: Option<f32>,
    pub soft_dof_vel_limit: Option<f32>,
    pub soft_torque_limit: Option<f32>,
    pub base_height_target: Option<f32>,
    pub max_contact_force: Option<f32>,
}

impl Overlay for RewardsConfig {
    type Patch = RewardsPatch;

    fn overlay(&mut self, patch: RewardsPatch) {
        // The weight table replaces wholesale: a variant declares its full
        // shaping, it does not splice terms into the base table.
        take(&mut self.scales, patch.scales);
        take(&mut self.only_positive_rewards, patch.only_positive_rewards);
        take(&mut self.tracking_sigma, patch.tracking_sigma);
        take(&mut self.soft_dof_pos_limit, patch.soft_dof_pos_limit);
        take(&mut self.soft_dof_vel_limit, patch.soft_dof_vel_limit);
        take(&mut self.soft_torque_limit, patch.soft_torque_limit);
        take(&mut self.base_height_target, patch.base_height_target);
        take(&mut self.max_contact_force, patch.max_contact_force);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use waddle_core::merge::merge;

    #[test]
    fn default_scales_validate() {
        assert!(RewardsConfig::default().validate().is_ok());
    }

    #[test]
    fn unregistered_term_rejected() {
        let scales = RewardScales::from_entries(&[("tracking_lin_vel", 1.0), ("jump_height", 2.0)]);
        let err = scales.validate().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRewardTerm(_)));
        assert!(err.to_string().contains("jump_height"));
    }

    #[test]
    fn resolved_covers_every_registered_term() {
        let scales = RewardScales::from_entries(&[("tracking_lin_vel", 1.0)]);
        let resolved = scales.resolved();
        assert_eq!(resolved.len(), REGISTERED_TERMS.len());
        assert!((resolved["tracking_lin_vel"] - 1.0).abs() < f32::EPSILON);
        // Omitted registered terms default to zero without aborting.
        assert!((resolved["stand_still"] - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn omitted_registered_terms_do_not_abort_validation() {
        // The load-time pass warns about absent terms but still succeeds.
        let cfg = RewardsConfig {
            scales: RewardScales::from_entries(&[("tracking_lin_vel", 1.0)]),
            ..RewardsConfig::default()
        };
        assert!(cfg.validate().is_ok());
        assert!((cfg.scales.resolved()["torques"] - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_weight_is_kept_not_dropped() {
        let scales = RewardScales::from_entries(&[("termination", 0.0)]);
        let resolved = scales.resolved();
        assert!(resolved.contains_key("termination"));
        assert!((resolved["termination"] - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn negative_weights_are_penalties() {
        let scales = RewardScales::from_entries(&[("torques", -0.000025)]);
        assert!(scales.validate().is_ok());
        assert!(scales.resolved()["torques"] < 0.0);
    }

    #[test]
    fn scales_table_replaces_wholesale() {
        let patch = RewardsPatch {
            scales: Some(RewardScales::from_entries(&[
                ("tracking_lin_vel", 1.0),
                ("tracking_ang_vel", 0.5),
                ("torques", -0.000025),
            ])),
            ..RewardsPatch::default()
        };
        let merged = merge(RewardsConfig::default(), patch);
        assert_eq!(merged.scales.0.len(), 3);
        // Base-only terms are gone, not merged in.
        assert!(!merged.scales.0.contains_key("feet_air_time"));
    }

    #[test]
    fn soft_limit_outside_unit_interval_rejected() {
        let cfg = RewardsConfig {
            soft_dof_pos_limit: 1.2,
            ..RewardsConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn scales_toml_shape_is_flat_map() {
        let doc = r"
            [scales]
            tracking_lin_vel = 1.0
            torques = -0.000025
        ";
        let patch: RewardsPatch = waddle_core::merge::patch_from_toml(doc).unwrap();
        let scales = patch.scales.unwrap();
        assert_eq!(scales.0.len(), 2);
    }
}
