//! PD control parameters and the per-joint parameter table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use waddle_core::error::{FatalConfigError, SchemaMismatchError};
use waddle_core::merge::{Overlay, take};

use crate::env::InitStateConfig;

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Actuation mode for the low-level joint controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    /// PD position control: torque from stiffness/damping around the target.
    Position,
    /// Velocity control.
    Velocity,
    /// Direct torque control.
    Torque,
}

/// Joint controller parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub control_type: ControlType,
    /// PD stiffness [N*m/rad] per joint name.
    pub stiffness: BTreeMap<String, f32>,
    /// PD damping [N*m*s/rad] per joint name.
    pub damping: BTreeMap<String, f32>,
    /// Action scale: `target = action_scale * action + default_angle`.
    pub action_scale: f32,
    /// Control action updates per policy step, at the simulation dt.
    /// `decimation * sim.dt` is the effective control period; change the two
    /// together deliberately.
    pub decimation: u32,
    /// When set, `effort` replaces every joint's native effort limit.
    pub override_effort: bool,
    /// Uniform effort limit [N*m], used only when `override_effort` is set.
    pub effort: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            control_type: ControlType::Position,
            stiffness: BTreeMap::new(),
            damping: BTreeMap::new(),
            action_scale: 0.5,
            decimation: 4,
            override_effort: false,
            effort: 0.0,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.decimation == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "control.decimation",
                message: "must be at least 1".into(),
            });
        }
        if self.action_scale <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "control.action_scale",
                message: format!("must be > 0, got {}", self.action_scale),
            });
        }
        if self.override_effort && self.effort <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "control.effort",
                message: format!(
                    "override_effort is set but effort is {}; a non-positive uniform limit \
                     would clamp every joint to zero torque",
                    self.effort
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlPatch {
    pub control_type: Option<ControlType>,
    pub stiffness: Option<BTreeMap<String, f32>>,
    pub damping: Option<BTreeMap<String, f32>>,
    pub action_scale: Option<f32>,
    pub decimation: Option<u32>,
    pub override_effort: Option<bool>,
    pub effort: Option<f32>,
}

impl Overlay for ControlConfig {
    type Patch = ControlPatch;

    fn overlay(&mut self, patch: ControlPatch) {
        take(&mut self.control_type, patch.control_type);
        // Gain maps replace wholesale; a variant declares its full gain set.
        take(&mut self.stiffness, patch.stiffness);
        take(&mut self.damping, patch.damping);
        take(&mut self.action_scale, patch.action_scale);
        take(&mut self.decimation, patch.decimation);
        take(&mut self.override_effort, patch.override_effort);
        take(&mut self.effort, patch.effort);
    }
}

// ---------------------------------------------------------------------------
// JointParamTable
// ---------------------------------------------------------------------------

/// Validated per-joint parameter table.
///
/// Construction proves that the default-pose, stiffness, and damping maps
/// share one key set of exactly `num_actions` joints; the key set of
/// `default_joint_angles` is the canonical joint list. Inconsistency between
/// these tables corrupts the actuation targets silently, so a mismatch aborts
/// composition and names the offending joint.
#[derive(Debug, Clone, PartialEq)]
pub struct JointParamTable {
    default_angles: BTreeMap<String, f32>,
    stiffness: BTreeMap<String, f32>,
    damping: BTreeMap<String, f32>,
    action_scale: f32,
    effort_override: Option<f32>,
}

impl JointParamTable {
    /// Build and validate the table from the init-state and control sections.
    pub fn build(
        init_state: &InitStateConfig,
        control: &ControlConfig,
        num_actions: usize,
    ) -> Result<Self, SchemaMismatchError> {
        let canonical = &init_state.default_joint_angles;
        if canonical.len() != num_actions {
            return Err(SchemaMismatchError::Cardinality {
                table: "default_joint_angles",
                expected: num_actions,
                got: canonical.len(),
            });
        }

        for (table, map) in [("stiffness", &control.stiffness), ("damping", &control.damping)] {
            for joint in canonical.keys() {
                if !map.contains_key(joint) {
                    return Err(SchemaMismatchError::MissingJoint {
                        table,
                        joint: joint.clone(),
                    });
                }
            }
            for joint in map.keys() {
                if !canonical.contains_key(joint) {
                    return Err(SchemaMismatchError::UnknownJoint {
                        table,
                        joint: joint.clone(),
                    });
                }
            }
        }

        Ok(Self {
            default_angles: init_state.default_joint_angles.clone(),
            stiffness: control.stiffness.clone(),
            damping: control.damping.clone(),
            action_scale: control.action_scale,
            effort_override: control.override_effort.then_some(control.effort),
        })
    }

    /// Canonical joint names, in lexicographic order.
    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.default_angles.keys().map(String::as_str)
    }

    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.default_angles.len()
    }

    #[must_use]
    pub fn default_angle(&self, joint: &str) -> Option<f32> {
        self.default_angles.get(joint).copied()
    }

    #[must_use]
    pub fn stiffness(&self, joint: &str) -> Option<f32> {
        self.stiffness.get(joint).copied()
    }

    #[must_use]
    pub fn damping(&self, joint: &str) -> Option<f32> {
        self.damping.get(joint).copied()
    }

    /// Actuation target consumed by the external control loop:
    /// `action_scale * action + default_angle`.
    #[must_use]
    pub fn effective_target(&self, joint: &str, action: f32) -> Option<f32> {
        self.default_angles
            .get(joint)
            .map(|angle| self.action_scale.mul_add(action, *angle))
    }

    /// Effort limit for a joint with the given native limit from the robot
    /// description. The configured uniform override, when set, wins for every
    /// joint.
    #[must_use]
    pub fn effort_limit(&self, native_limit: f32) -> f32 {
        self.effort_override.unwrap_or(native_limit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
