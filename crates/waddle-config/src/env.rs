//! Environment-level configuration: task dimensions, observation layout,
//! initial state, and normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};
use waddle_core::motion::MotionSource;

// ---------------------------------------------------------------------------
// ObservationLayout
// ---------------------------------------------------------------------------

/// Declared composition of the policy observation vector.
///
/// The external environment assembles observations as
/// `base + command + aux + per_step * history_steps`, where `history_steps`
/// is 1 when history stacking is disabled. `num_observations` and
/// `num_privileged_obs` must agree with this arithmetic; a mismatch here is
/// the classic silent-corruption bug this layer exists to catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationLayout {
    /// Proprioceptive base features (e.g. projected gravity, base angular
    /// velocity) present exactly once.
    pub base_dim: usize,
    /// Velocity/heading command features present exactly once.
    pub command_dim: usize,
    /// Auxiliary-encoder (RMA latent) features, 0 when the encoder is off.
    pub aux_dim: usize,
    /// Per-control-step features (joint positions, joint velocities, previous
    /// actions); repeated once per history step when history is enabled.
    pub per_step_dim: usize,
    /// Extra privileged features appended for the critic (e.g. true base
    /// linear velocity). Only meaningful when `num_privileged_obs` is set.
    pub privileged_extra_dim: usize,
}

impl Default for ObservationLayout {
    fn default() -> Self {
        // Base biped: lin vel (3) + ang vel (3) + gravity (3), commands (3),
        // and 3 per-joint terms for a 12-DOF robot.
        Self {
            base_dim: 9,
            command_dim: 3,
            aux_dim: 0,
            per_step_dim: 36,
            privileged_extra_dim: 0,
        }
    }
}

impl ObservationLayout {
    /// Expected `num_observations` for the given history setting.
    #[must_use]
    pub fn observation_total(&self, history_steps: Option<u32>) -> usize {
        let steps = history_steps.unwrap_or(1) as usize;
        self.base_dim + self.command_dim + self.aux_dim + self.per_step_dim * steps
    }

    /// Expected `num_privileged_obs` for the given history setting.
    #[must_use]
    pub fn privileged_total(&self, history_steps: Option<u32>) -> usize {
        self.observation_total(history_steps) + self.privileged_extra_dim
    }
}

// ---------------------------------------------------------------------------
// EnvConfig
// ---------------------------------------------------------------------------

/// Task-level environment parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Number of parallel simulated environments.
    pub num_envs: u32,
    /// Policy observation dimensionality. Must match [`ObservationLayout`].
    pub num_observations: usize,
    /// Critic (privileged) observation dimensionality; `None` means the
    /// critic sees the policy observation.
    pub num_privileged_obs: Option<usize>,
    /// Number of actuated joints. Anchors every per-joint table.
    pub num_actions: usize,
    /// Grid spacing between environment origins, in meters.
    pub env_spacing: f32,
    /// Report timeouts to the algorithm (bootstrapping on time limit).
    pub send_timeouts: bool,
    /// Episode length in seconds of simulated time.
    pub episode_length_s: f32,
    /// Observation history stacking; `None` disables history.
    pub include_history_steps: Option<u32>,
    /// Initialize episodes from reference motion states.
    pub reference_state_initialization: bool,
    /// Probability of reference-state initialization per reset.
    pub reference_state_initialization_prob: f32,
    /// Reference motions for the AMP discriminator.
    pub amp_motion_files: MotionSource,
    /// End-effector body names, in order.
    pub ee_names: Vec<String>,
    /// Source velocity commands from a joystick instead of the sampler.
    pub get_commands_from_joystick: bool,
    /// Declared observation composition (see [`ObservationLayout`]).
    pub observation_layout: ObservationLayout,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_envs: 4096,
            num_observations: 48,
            num_privileged_obs: None,
            num_actions: 12,
            env_spacing: 3.0,
            send_timeouts: true,
            episode_length_s: 20.0,
            include_history_steps: None,
            reference_state_initialization: false,
            reference_state_initialization_prob: 0.85,
            amp_motion_files: MotionSource::default(),
            ee_names: Vec::new(),
            get_commands_from_joystick: false,
            observation_layout: ObservationLayout::default(),
        }
    }
}

impl EnvConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.num_actions == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "env.num_actions",
                message: "must be at least 1".into(),
            });
        }
        if self.episode_length_s <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "env.episode_length_s",
                message: format!("must be > 0, got {}", self.episode_length_s),
            });
        }
        if self.include_history_steps == Some(0) {
            return Err(FatalConfigError::InvalidValue {
                field: "env.include_history_steps",
                message: "history of 0 steps is meaningless; use None to disable".into(),
            });
        }
        let prob = self.reference_state_initialization_prob;
        if !(0.0..=1.0).contains(&prob) {
            return Err(FatalConfigError::InvalidValue {
                field: "env.reference_state_initialization_prob",
                message: format!("must be in [0, 1], got {prob}"),
            });
        }

        let expected = self
            .observation_layout
            .observation_total(self.include_history_steps);
        if self.num_observations != expected {
            return Err(FatalConfigError::ObservationDimMismatch {
                declared: self.num_observations,
                expected,
            });
        }
        if let Some(declared) = self.num_privileged_obs {
            let expected = self
                .observation_layout
                .privileged_total(self.include_history_steps);
            if declared != expected {
                return Err(FatalConfigError::PrivilegedDimMismatch { declared, expected });
            }
        }
        Ok(())
    }
}

/// Partial override for [`EnvConfig`].
///
/// `num_privileged_obs` and `include_history_steps` can only be enabled by an
/// override, never reset to `None`; disabling them is a base-schema concern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvPatch {
    pub num_envs: Option<u32>,
    pub num_observations: Option<usize>,
    pub num_privileged_obs: Option<usize>,
    pub num_actions: Option<usize>,
    pub env_spacing: Option<f32>,
    pub send_timeouts: Option<bool>,
    pub episode_length_s: Option<f32>,
    pub include_history_steps: Option<u32>,
    pub reference_state_initialization: Option<bool>,
    pub reference_state_initialization_prob: Option<f32>,
    pub amp_motion_files: Option<MotionSource>,
    pub ee_names: Option<Vec<String>>,
    pub get_commands_from_joystick: Option<bool>,
    pub observation_layout: Option<ObservationLayout>,
}

impl Overlay for EnvConfig {
    type Patch = EnvPatch;

    fn overlay(&mut self, patch: EnvPatch) {
        take(&mut self.num_envs, patch.num_envs);
        take(&mut self.num_observations, patch.num_observations);
        if let Some(v) = patch.num_privileged_obs {
            self.num_privileged_obs = Some(v);
        }
        take(&mut self.num_actions, patch.num_actions);
        take(&mut self.env_spacing, patch.env_spacing);
        take(&mut self.send_timeouts, patch.send_timeouts);
        take(&mut self.episode_length_s, patch.episode_length_s);
        if let Some(v) = patch.include_history_steps {
            self.include_history_steps = Some(v);
        }
        take(
            &mut self.reference_state_initialization,
            patch.reference_state_initialization,
        );
        take(
            &mut self.reference_state_initialization_prob,
            patch.reference_state_initialization_prob,
        );
        take(&mut self.amp_motion_files, patch.amp_motion_files);
        take(&mut self.ee_names, patch.ee_names);
        take(
            &mut self.get_commands_from_joystick,
            patch.get_commands_from_joystick,
        );
        take(&mut self.observation_layout, patch.observation_layout);
    }
}

// ---------------------------------------------------------------------------
// InitStateConfig
// ---------------------------------------------------------------------------

/// Initial base pose/twist and the default joint pose.
///
/// `default_joint_angles` is the canonical joint-name list for the variant:
/// every other per-joint table is validated against its key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitStateConfig {
    /// Base position [x, y, z] in meters.
    pub pos: [f32; 3],
    /// Base orientation quaternion [x, y, z, w].
    pub rot: [f32; 4],
    /// Base linear velocity [m/s].
    pub lin_vel: [f32; 3],
    /// Base angular velocity [rad/s].
    pub ang_vel: [f32; 3],
    /// Target joint angles [rad] when the action is zero.
    pub default_joint_angles: BTreeMap<String, f32>,
}

impl Default for InitStateConfig {
    fn default() -> Self {
        Self {
            pos: [0.0, 0.0, 1.0],
            rot: [0.0, 0.0, 0.0, 1.0],
            lin_vel: [0.0; 3],
            ang_vel: [0.0; 3],
            default_joint_angles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitStatePatch {
    pub pos: Option<[f32; 3]>,
    pub rot: Option<[f32; 4]>,
    pub lin_vel: Option<[f32; 3]>,
    pub ang_vel: Option<[f32; 3]>,
    pub default_joint_angles: Option<BTreeMap<String, f32>>,
}

impl Overlay for InitStateConfig {
    type Patch = InitStatePatch;

    fn overlay(&mut self, patch: InitStatePatch) {
        take(&mut self.pos, patch.pos);
        take(&mut self.rot, patch.rot);
        take(&mut self.lin_vel, patch.lin_vel);
        take(&mut self.ang_vel, patch.ang_vel);
        // Wholesale replacement: a variant declares its full joint pose.
        take(&mut self.default_joint_angles, patch.default_joint_angles);
    }
}

// ---------------------------------------------------------------------------
// NormalizationConfig
// ---------------------------------------------------------------------------

/// Observation scale factors applied before clipping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObsScales {
    pub lin_vel: f32,
    pub ang_vel: f32,
    pub dof_pos: f32,
    pub dof_vel: f32,
    pub height_measurements: f32,
}

impl Default for ObsScales {
    fn default() -> Self {
        Self {
            lin_vel: 2.0,
            ang_vel: 0.25,
            dof_pos: 1.0,
            dof_vel: 0.05,
            height_measurements: 5.0,
        }
    }
}

/// Observation/action normalization and clipping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub obs_scales: ObsScales,
    pub clip_observations: f32,
    pub clip_actions: f32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            obs_scales: ObsScales::default(),
            clip_observations: 100.0,
            clip_actions: 100.0,
        }
    }
}

impl NormalizationConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.clip_observations <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "normalization.clip_observations",
                message: format!("must be > 0, got {}", self.clip_observations),
            });
        }
        if self.clip_actions <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "normalization.clip_actions",
                message: format!("must be > 0, got {}", self.clip_actions),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizationPatch {
    pub obs_scales: Option<ObsScales>,
    pub clip_observations: Option<f32>,
    pub clip_actions: Option<f32>,
}

impl Overlay for NormalizationConfig {
    type Patch = NormalizationPatch;

    fn overlay(&mut self, patch: NormalizationPatch) {
        take(&mut self.obs_scales, patch.obs_scales);
        take(&mut self.clip_observations, patch.clip_observations);
        take(&mut self.clip_actions, patch.clip_actions);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
