//! Built-in robot variant presets.
//!
//! Each preset is a fully-declared [`RobotVariantConfig`] for one robot and
//! training recipe. Presets are plain functions, not files on disk, so the
//! compiler enforces their shape; file-based customization goes through an
//! override document on top of a preset.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::RobotVariantConfig;
use crate::commands::{CommandRanges, CommandsConfig};
use crate::control::{ControlConfig, ControlType};
use crate::domain_rand::DomainRandConfig;
use crate::env::{
    EnvConfig, InitStateConfig, NormalizationConfig, ObsScales, ObservationLayout,
};
use crate::noise::{NoiseConfig, NoiseScales};
use crate::rewards::{RewardScales, RewardsConfig};
use crate::sim::{
    AssetConfig, DofDriveMode, MeshType, ROOT_DIR_PLACEHOLDER, SimConfig, TerrainConfig,
    ViewerConfig,
};
use waddle_core::motion::MotionSource;

/// Actuated joints of the BDX duck biped, in declaration order.
pub const BDX_JOINT_NAMES: [&str; 15] = [
    "right_hip_yaw",
    "right_hip_roll",
    "right_hip_pitch",
    "right_knee",
    "right_ankle",
    "left_hip_yaw",
    "left_hip_roll",
    "left_hip_pitch",
    "left_knee",
    "left_ankle",
    "neck_pitch",
    "head_pitch",
    "head_yaw",
    "left_antenna",
    "right_antenna",
];

/// Names of all built-in variants, lookup keys for [`variant`].
pub const VARIANT_NAMES: [&str; 2] = ["bdx_amp", "bdx_amp_rma"];

/// Look up a built-in variant by name.
#[must_use]
pub fn variant(name: &str) -> Option<RobotVariantConfig> {
    match name {
        "bdx_amp" => Some(bdx_amp()),
        "bdx_amp_rma" => Some(bdx_amp_rma()),
        _ => None,
    }
}

fn uniform_gains(value: f32) -> BTreeMap<String, f32> {
    BDX_JOINT_NAMES
        .iter()
        .map(|name| ((*name).to_owned(), value))
        .collect()
}

/// Crouched idle pose produced by the BDX whole-body planner.
fn bdx_default_pose() -> BTreeMap<String, f32> {
    [
        ("right_hip_yaw", -0.036_767_31_f32),
        ("right_hip_roll", -0.030_315_21),
        ("right_hip_pitch", 0.406_581_5),
        ("right_knee", -1.086_406_5),
        ("right_ankle", 0.593_232_5),
        ("left_hip_yaw", -0.034_857_57),
        ("left_hip_roll", 0.052_286_05),
        ("left_hip_pitch", 0.366_236_0),
        ("left_knee", -0.964_204_5),
        ("left_ankle", 0.511_297_1),
        ("neck_pitch", -0.174_532_93),
        ("head_pitch", -0.174_532_93),
        ("head_yaw", 0.0),
        ("left_antenna", 0.0),
        ("right_antenna", 0.0),
    ]
    .into_iter()
    .map(|(name, angle)| (name.to_owned(), angle))
    .collect()
}

fn bdx_rewards() -> RewardsConfig {
    RewardsConfig {
        // Full shaping declared explicitly; zeros keep terms visible in logs.
        scales: RewardScales::from_entries(&[
            ("termination", 0.0),
            ("tracking_lin_vel", 1.0),
            ("tracking_ang_vel", 0.5),
            ("lin_vel_z", 0.0),
            ("ang_vel_xy", 0.0),
            ("orientation", 0.0),
            ("torques", -0.000_025),
            ("dof_vel", 0.0),
            ("dof_acc", 0.0),
            ("base_height", 0.0),
            ("feet_air_time", 0.0),
            ("collision", 0.0),
            ("feet_stumble", 0.0),
            ("action_rate", 0.0),
            ("stand_still", 0.0),
            ("dof_pos_limits", 0.0),
        ]),
        only_positive_rewards: false,
        tracking_sigma: 0.25,
        soft_dof_pos_limit: 0.9,
        soft_dof_vel_limit: 1.0,
        soft_torque_limit: 1.0,
        base_height_target: 0.175,
        max_contact_force: 100.0,
    }
}

fn bdx_base() -> RobotVariantConfig {
    RobotVariantConfig {
        name: "bdx_amp".into(),
        env: EnvConfig {
            num_envs: 8,
            num_observations: 51,
            num_privileged_obs: Some(57),
            num_actions: 15,
            env_spacing: 1.0,
            send_timeouts: true,
            episode_length_s: 8.0,
            include_history_steps: None,
            reference_state_initialization: false,
            reference_state_initialization_prob: 0.85,
            amp_motion_files: MotionSource::Files(vec![PathBuf::from(
                "datasets/bdx/new_placo_moves_faster/bdx_walk_forward_medium.txt",
            )]),
            ee_names: vec!["left_foot".into(), "right_foot".into()],
            get_commands_from_joystick: false,
            observation_layout: ObservationLayout {
                // Projected gravity once, commands once, then joint positions,
                // joint velocities, and previous actions per control step. The
                // critic additionally sees the true base twist.
                base_dim: 3,
                command_dim: 3,
                aux_dim: 0,
                per_step_dim: 45,
                privileged_extra_dim: 6,
            },
        },
        init_state: InitStateConfig {
            pos: [0.0, 0.0, 0.18],
            rot: [0.0, 0.0, 0.0, 1.0],
            lin_vel: [0.0; 3],
            ang_vel: [0.0; 3],
            default_joint_angles: bdx_default_pose(),
        },
        control: ControlConfig {
            control_type: ControlType::Position,
            stiffness: uniform_gains(10.0),
            damping: uniform_gains(0.05),
            action_scale: 0.25,
            decimation: 6,
            override_effort: true,
            effort: 0.52,
        },
        normalization: NormalizationConfig {
            obs_scales: ObsScales::default(),
            clip_observations: 5.0,
            clip_actions: 1.0,
        },
        noise: NoiseConfig {
            add_noise: false,
            noise_level: 1.0,
            scales: NoiseScales {
                dof_pos: 0.03,
                dof_vel: 0.1,
                lin_vel: 0.1,
                ang_vel: 0.3,
                gravity: 0.05,
                height_measurements: 0.1,
            },
        },
        commands: CommandsConfig {
            curriculum: false,
            max_curriculum: 0.2,
            num_commands: 3,
            resampling_time: 10.0,
            heading_command: false,
            // Fixed medium forward walk, matching the reference motion.
            ranges: CommandRanges {
                lin_vel_x: [0.3, 0.3],
                lin_vel_y: [0.0, 0.0],
                ang_vel_yaw: [0.0, 0.0],
                heading: [0.0, 0.0],
            },
        },
        domain_rand: DomainRandConfig {
            randomize_friction: false,
            friction_range: [0.8, 1.2],
            randomize_base_mass: false,
            added_mass_range: [-0.05, 0.05],
            randomize_gains: false,
            stiffness_multiplier_range: [0.9, 1.1],
            damping_multiplier_range: [0.9, 1.1],
            push_robots: false,
            push_interval_s: 15.0,
            max_push_vel_xy: 0.1,
            ..DomainRandConfig::default()
        },
        rewards: bdx_rewards(),
        sim: SimConfig {
            dt: 0.005,
            substeps: 1,
            gravity: [0.0, 0.0, -9.81],
        },
        terrain: TerrainConfig {
            mesh_type: MeshType::Plane,
            static_friction: 5.0,
            dynamic_friction: 5.0,
            restitution: 0.0,
            measure_heights: false,
        },
        asset: AssetConfig {
            file: format!("{ROOT_DIR_PLACEHOLDER}/resources/robots/bdx/urdf/bdx.urdf"),
            foot_name: "foot".into(),
            penalize_contacts_on: Vec::new(),
            terminate_after_contacts_on: vec![
                "body_module".into(),
                "head".into(),
                "left_antenna".into(),
                "right_antenna".into(),
                "leg_module".into(),
                "leg_module_2".into(),
            ],
            default_dof_drive_mode: DofDriveMode::None,
            disable_gravity: false,
            fix_base_link: false,
            enable_self_collisions: false,
            flip_visual_attachments: false,
            armature: 0.0,
            angular_damping: 0.0,
        },
        viewer: ViewerConfig {
            ref_env: 0,
            pos: [0.0, 0.0, 1.0],
            lookat: [11.0, 5.0, 3.0],
        },
    }
}

/// BDX duck biped, AMP imitation of a single medium-speed forward walk.
#[must_use]
pub fn bdx_amp() -> RobotVariantConfig {
    bdx_base()
}

/// BDX with the adaptation-module recipe: observation history stacking, an
/// auxiliary encoder latent, and the wider motion library, trained against
/// domain randomization.
#[must_use]
pub fn bdx_amp_rma() -> RobotVariantConfig {
    let mut cfg = bdx_base();
    cfg.name = "bdx_amp_rma".into();
    cfg.env.amp_motion_files = MotionSource::Glob("datasets/bdx/new_placo_moves/*.txt".into());
    cfg.env.include_history_steps = Some(5);
    cfg.env.observation_layout.aux_dim = 8;
    // 3 + 3 + 8 + 45 * 5, plus the privileged extras for the critic.
    cfg.env.num_observations = 239;
    cfg.env.num_privileged_obs = Some(245);
    cfg.domain_rand.randomize_friction = true;
    cfg.domain_rand.randomize_base_mass = true;
    cfg.domain_rand.randomize_gains = true;
    cfg.domain_rand.push_robots = true;
    cfg
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_variant_validates() {
        for name in VARIANT_NAMES {
            let cfg = variant(name).unwrap();
            assert_eq!(cfg.name, name);
            cfg.validate().unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn unknown_variant_is_none() {
        assert!(variant("bdx_apm").is_none());
    }

    #[test]
    fn bdx_joint_tables_are_consistent() {
        let cfg = bdx_amp();
        let table = cfg.joint_table().unwrap();
        assert_eq!(table.num_joints(), 15);
        for joint in BDX_JOINT_NAMES {
            assert!(table.default_angle(joint).is_some(), "missing {joint}");
            assert!((table.stiffness(joint).unwrap() - 10.0).abs() < f32::EPSILON);
            assert!((table.damping(joint).unwrap() - 0.05).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn bdx_observation_arithmetic() {
        let cfg = bdx_amp();
        let layout = cfg.env.observation_layout;
        assert_eq!(layout.observation_total(None), 51);
        assert_eq!(layout.privileged_total(None), 57);
    }

    #[test]
    fn bdx_control_period() {
        // 6 * 0.005 = 30 ms per policy step.
        assert!((bdx_amp().control_dt() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn bdx_effort_override() {
        let table = bdx_amp().joint_table().unwrap();
        assert!((table.effort_limit(10.0) - 0.52).abs() < f32::EPSILON);
    }

    #[test]
    fn bdx_actuation_target_from_crouch() {
        let table = bdx_amp().joint_table().unwrap();
        // 0.25 * 0.4 + right_knee default.
        let target = table.effective_target("right_knee", 0.4).unwrap();
        assert!((target - (0.25f32 * 0.4 - 1.086_406_5)).abs() < 1e-6);
    }

    #[test]
    fn bdx_starts_from_the_default_pose_not_reference_states() {
        let cfg = bdx_amp();
        assert!(!cfg.env.reference_state_initialization);
        assert!((cfg.env.reference_state_initialization_prob - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn bdx_viewer_camera_sits_at_robot_height() {
        let viewer = bdx_amp().viewer;
        assert_eq!(viewer.ref_env, 0);
        assert_eq!(viewer.pos, [0.0, 0.0, 1.0]);
        assert_eq!(viewer.lookat, [11.0, 5.0, 3.0]);
    }

    #[test]
    fn rma_variant_layout_accounts_for_history_and_latent() {
        let cfg = bdx_amp_rma();
        assert_eq!(cfg.env.include_history_steps, Some(5));
        assert_eq!(
            cfg.env
                .observation_layout
                .observation_total(cfg.env.include_history_steps),
            239
        );
        assert_eq!(cfg.env.num_privileged_obs, Some(245));
    }

    #[test]
    fn rma_variant_randomizes_dynamics() {
        let cfg = bdx_amp_rma();
        assert!(cfg.domain_rand.randomize_friction);
        assert!(cfg.domain_rand.randomize_gains);
        assert!(cfg.domain_rand.push_robots);
        // The imitation variant trains in a clean world.
        assert!(!bdx_amp().domain_rand.randomize_friction);
    }
}
