//! Physics, terrain, asset, and viewer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

/// Placeholder in asset paths, substituted with the repository root at load
/// time.
pub const ROOT_DIR_PLACEHOLDER: &str = "{WADDLE_ROOT_DIR}";

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Physics stepping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Physics timestep in seconds.
    pub dt: f64,
    /// Solver substeps per physics step.
    pub substeps: u32,
    /// Gravity vector [x, y, z] in m/s^2.
    pub gravity: [f32; 3],
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.005,
            substeps: 1,
            gravity: [0.0, 0.0, -9.81],
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.dt <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "sim.dt",
                message: format!("must be > 0, got {}", self.dt),
            });
        }
        if self.substeps == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "sim.substeps",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimPatch {
    pub dt: Option<f64>,
    pub substeps: Option<u32>,
    pub gravity: Option<[f32; 3]>,
}

impl Overlay for SimConfig {
    type Patch = SimPatch;

    fn overlay(&mut self, patch: SimPatch) {
        take(&mut self.dt, patch.dt);
        take(&mut self.substeps, patch.substeps);
        take(&mut self.gravity, patch.gravity);
    }
}

// ---------------------------------------------------------------------------
// TerrainConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshType {
    Plane,
    Heightfield,
    Trimesh,
}

/// Ground geometry and contact material parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub mesh_type: MeshType,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
    /// Sample terrain heights around the base for the observation.
    pub measure_heights: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mesh_type: MeshType::Trimesh,
            static_friction: 1.0,
            dynamic_friction: 1.0,
            restitution: 0.0,
            measure_heights: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerrainPatch {
    pub mesh_type: Option<MeshType>,
    pub static_friction: Option<f32>,
    pub dynamic_friction: Option<f32>,
    pub restitution: Option<f32>,
    pub measure_heights: Option<bool>,
}

impl Overlay for TerrainConfig {
    type Patch = TerrainPatch;

    fn overlay(&mut self, patch: TerrainPatch) {
        take(&mut self.mesh_type, patch.mesh_type);
        take(&mut self.static_friction, patch.static_friction);
        take(&mut self.dynamic_friction, patch.dynamic_friction);
        take(&mut self.restitution, patch.restitution);
        take(&mut self.measure_heights, patch.measure_heights);
    }
}

// ---------------------------------------------------------------------------
// AssetConfig
// ---------------------------------------------------------------------------

/// Drive mode applied to joints the control section does not claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DofDriveMode {
    /// Joints are left undriven.
    #[default]
    None,
    /// Position target drive.
    Position,
    /// Velocity target drive.
    Velocity,
    /// Direct effort drive.
    Effort,
}

/// Robot description (URDF) and collision/termination setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// URDF path; may contain [`ROOT_DIR_PLACEHOLDER`].
    pub file: String,
    /// Substring identifying foot links.
    pub foot_name: String,
    /// Links whose contacts are penalized by the reward engine.
    pub penalize_contacts_on: Vec<String>,
    /// Links whose contacts terminate the episode.
    pub terminate_after_contacts_on: Vec<String>,
    /// Simulator-side drive mode for joints without configured gains.
    pub default_dof_drive_mode: DofDriveMode,
    pub disable_gravity: bool,
    pub fix_base_link: bool,
    pub enable_self_collisions: bool,
    pub flip_visual_attachments: bool,
    /// Rotor inertia added to each joint.
    pub armature: f32,
    pub angular_damping: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            file: String::new(),
            foot_name: "foot".into(),
            penalize_contacts_on: Vec::new(),
            terminate_after_contacts_on: Vec::new(),
            default_dof_drive_mode: DofDriveMode::None,
            disable_gravity: false,
            fix_base_link: false,
            enable_self_collisions: false,
            flip_visual_attachments: true,
            armature: 0.0,
            angular_damping: 0.0,
        }
    }
}

impl AssetConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        if self.file.is_empty() {
            return Err(FatalConfigError::InvalidValue {
                field: "asset.file",
                message: "no robot description declared".into(),
            });
        }
        Ok(())
    }

    /// Asset path with the root-directory placeholder substituted.
    #[must_use]
    pub fn resolved_file(&self, root: &Path) -> PathBuf {
        PathBuf::from(
            self.file
                .replace(ROOT_DIR_PLACEHOLDER, &root.to_string_lossy()),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetPatch {
    pub file: Option<String>,
    pub foot_name: Option<String>,
    pub penalize_contacts_on: Option<Vec<String>>,
    pub terminate_after_contacts_on: Option<Vec<String>>,
    pub default_dof_drive_mode: Option<DofDriveMode>,
    pub disable_gravity: Option<bool>,
    pub fix_base_link: Option<bool>,
    pub enable_self_collisions: Option<bool>,
    pub flip_visual_attachments: Option<bool>,
    pub armature: Option<f32>,
    pub angular_damping: Option<f32>,
}

impl Overlay for AssetConfig {
    type Patch = AssetPatch;

    fn overlay(&mut self, patch: AssetPatch) {
        take(&mut self.file, patch.file);
        take(&mut self.foot_name, patch.foot_name);
        take(&mut self.penalize_contacts_on, patch.penalize_contacts_on);
        take(
            &mut self.terminate_after_contacts_on,
            patch.terminate_after_contacts_on,
        );
        take(&mut self.default_dof_drive_mode, patch.default_dof_drive_mode);
        take(&mut self.disable_gravity, patch.disable_gravity);
        take(&mut self.fix_base_link, patch.fix_base_link);
        take(&mut self.enable_self_collisions, patch.enable_self_collisions);
        take(
            &mut self.flip_visual_attachments,
            patch.flip_visual_attachments,
        );
        take(&mut self.armature, patch.armature);
        take(&mut self.angular_damping, patch.angular_damping);
    }
}

// ---------------------------------------------------------------------------
// ViewerConfig
// ---------------------------------------------------------------------------

/// Debug viewer camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Environment index the camera follows.
    pub ref_env: u32,
    /// Camera position [m].
    pub pos: [f32; 3],
    /// Camera look-at point [m].
    pub lookat: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            ref_env: 0,
            pos: [10.0, 0.0, 6.0],
            lookat: [11.0, 5.0, 3.0],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerPatch {
    pub ref_env: Option<u32>,
    pub pos: Option<[f32; 3]>,
    pub lookat: Option<[f32; 3]>,
}

impl Overlay for ViewerConfig {
    type Patch = ViewerPatch;

    fn overlay(&mut self, patch: ViewerPatch) {
        take(&mut self.ref_env, patch.ref_env);
        take(&mut self.pos, patch.pos);
        take(&mut self.lookat, patch.lookat);
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
    fn sim_defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn sim_rejects_non_positive_dt() {
        let cfg = SimConfig {
            dt: 0.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig {
            dt: -0.005,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sim_rejects_zero_substeps() {
        let cfg = SimConfig {
            substeps: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn asset_placeholder_substitution() {
        let asset = AssetConfig {
            file: format!("{ROOT_DIR_PLACEHOLDER}/resources/robots/bdx/urdf/bdx.urdf"),
            ..AssetConfig::default()
        };
        let resolved = asset.resolved_file(Path::new("/opt/waddle"));
        assert_eq!(
            resolved,
            PathBuf::from("/opt/waddle/resources/robots/bdx/urdf/bdx.urdf")
        );
    }

    #[test]
    fn asset_without_placeholder_unchanged() {
        let asset = AssetConfig {
            file: "/abs/robot.urdf".into(),
            ..AssetConfig::default()
        };
        assert_eq!(
            asset.resolved_file(Path::new("/opt/waddle")),
            PathBuf::from("/abs/robot.urdf")
        );
    }

    #[test]
    fn empty_asset_file_rejected() {
        assert!(AssetConfig::default().validate().is_err());
    }

    #[test]
    fn terrain_patch_overrides() {
        let patch = TerrainPatch {
            mesh_type: Some(MeshType::Plane),
            static_friction: Some(5.0),
            dynamic_friction: Some(5.0),
            measure_heights: Some(false),
            ..TerrainPatch::default()
        };
        let merged = merge(TerrainConfig::default(), patch);
        assert_eq!(merged.mesh_type, MeshType::Plane);
        assert!((merged.static_friction - 5.0).abs() < f32::EPSILON);
        assert!(!merged.measure_heights);
        // Untouched field keeps base value.
        assert!((merged.restitution - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn undriven_joints_by_default() {
        assert_eq!(AssetConfig::default().default_dof_drive_mode, DofDriveMode::None);
    }

    #[test]
    fn drive_mode_toml_naming() {
        let cfg: AssetConfig = toml::from_str("default_dof_drive_mode = \"position\"").unwrap();
        assert_eq!(cfg.default_dof_drive_mode, DofDriveMode::Position);
    }

    #[test]
    fn mesh_type_toml_naming() {
        let cfg: TerrainConfig = toml::from_str("mesh_type = \"plane\"").unwrap();
        assert_eq!(cfg.mesh_type, MeshType::Plane);
    }

    #[test]
    fn viewer_patch_overrides() {
        let patch = ViewerPatch {
            pos: Some([0.0, 0.0, 1.0]),
            ..ViewerPatch::default()
        };
        let merged = merge(ViewerConfig::default(), patch);
        assert!((merged.pos[2] - 1.0).abs() < f32::EPSILON);
        assert_eq!(merged.ref_env, 0);
    }
}
