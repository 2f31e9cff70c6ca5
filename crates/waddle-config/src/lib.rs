//! Simulation-side training configuration for the waddle locomotion stack.
//!
//! A robot variant is composed exactly once at bootstrap: a preset base, an
//! optional override document merged on top, then a full validation pass.
//! After composition the [`RobotVariantConfig`] is frozen and handed to the
//! simulator and learner as a read-only resource. No parameter is re-read or
//! re-merged mid-run.

pub mod commands;
pub mod control;
pub mod domain_rand;
pub mod env;
pub mod noise;
pub mod presets;
pub mod rewards;
pub mod sim;

use std::path::Path;

use bevy::ecs::resource::Resource;
use serde::{Deserialize, Serialize};

use waddle_core::error::ConfigError;
use waddle_core::merge::{Overlay, merge, patch_from_toml};
use waddle_core::motion::MotionFileSet;

use crate::commands::{CommandsConfig, CommandsPatch};
use crate::control::{ControlConfig, ControlPatch, JointParamTable};
use crate::domain_rand::{DomainRandConfig, DomainRandPatch};
use crate::env::{
    EnvConfig, EnvPatch, InitStateConfig, InitStatePatch, NormalizationConfig, NormalizationPatch,
};
use crate::noise::{NoiseConfig, NoisePatch};
use crate::rewards::{RewardsConfig, RewardsPatch};
use crate::sim::{
    AssetConfig, AssetPatch, SimConfig, SimPatch, TerrainConfig, TerrainPatch, ViewerConfig,
    ViewerPatch,
};

// ---------------------------------------------------------------------------
// RobotVariantConfig
// ---------------------------------------------------------------------------

/// The complete, frozen configuration for one robot training variant.
#[derive(Debug, Clone, PartialEq, Serialize, Resource)]
pub struct RobotVariantConfig {
    /// Variant name; tags error messages and run directories.
    pub name: String,
    pub env: EnvConfig,
    pub init_state: InitStateConfig,
    pub control: ControlConfig,
    pub normalization: NormalizationConfig,
    pub noise: NoiseConfig,
    pub commands: CommandsConfig,
    pub domain_rand: DomainRandConfig,
    pub rewards: RewardsConfig,
    pub sim: SimConfig,
    pub terrain: TerrainConfig,
    pub asset: AssetConfig,
    pub viewer: ViewerConfig,
}

impl Default for RobotVariantConfig {
    fn default() -> Self {
        Self {
            name: "base".into(),
            env: EnvConfig::default(),
            init_state: InitStateConfig::default(),
            control: ControlConfig::default(),
            normalization: NormalizationConfig::default(),
            noise: NoiseConfig::default(),
            commands: CommandsConfig::default(),
            domain_rand: DomainRandConfig::default(),
            rewards: RewardsConfig::default(),
            sim: SimConfig::default(),
            terrain: TerrainConfig::default(),
            asset: AssetConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl RobotVariantConfig {
    /// Merge an override document on top of this variant and re-validate.
    ///
    /// This is the single composition step: preset base, one override, one
    /// validation pass. Overrides cannot be stacked at runtime.
    pub fn compose(self, overrides: RobotVariantOverride) -> Result<Self, ConfigError> {
        let composed = merge(self, overrides);
        composed.validate()?;
        Ok(composed)
    }

    /// Run every structural check. Pure; touches no files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.checked().map_err(|e| e.in_variant(&self.name))
    }

    fn checked(&self) -> Result<(), ConfigError> {
        self.env.validate()?;
        self.control.validate()?;
        self.normalization.validate()?;
        self.commands.validate()?;
        self.domain_rand.validate()?;
        self.rewards.validate()?;
        self.sim.validate()?;
        self.asset.validate()?;
        // Proves the per-joint tables share one key set of num_actions joints.
        JointParamTable::build(&self.init_state, &self.control, self.env.num_actions)?;
        Ok(())
    }

    /// The validated per-joint parameter table.
    pub fn joint_table(&self) -> Result<JointParamTable, ConfigError> {
        JointParamTable::build(&self.init_state, &self.control, self.env.num_actions)
            .map_err(|e| ConfigError::from(e).in_variant(&self.name))
    }

    /// Effective control period in seconds: `decimation * sim.dt`.
    #[must_use]
    pub fn control_dt(&self) -> f64 {
        f64::from(self.control.decimation) * self.sim.dt
    }

    /// Resolve the declared reference-motion source against a dataset root.
    ///
    /// The only filesystem pass of composition; kept separate from
    /// [`Self::validate`] so structural checks need no dataset on disk.
    pub fn resolve_motion_files(&self, root: &Path) -> Result<MotionFileSet, ConfigError> {
        MotionFileSet::resolve(&self.env.amp_motion_files, root)
            .map_err(|e| e.in_variant(&self.name))
    }
}

// ---------------------------------------------------------------------------
// RobotVariantOverride
// ---------------------------------------------------------------------------

/// A partial override document, one optional patch per section.
///
/// Parsed with `deny_unknown_fields` at every level, so a typo'd section or
/// field name fails composition instead of being silently dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotVariantOverride {
    pub env: Option<EnvPatch>,
    pub init_state: Option<InitStatePatch>,
    pub control: Option<ControlPatch>,
    pub normalization: Option<NormalizationPatch>,
    pub noise: Option<NoisePatch>,
    pub commands: Option<CommandsPatch>,
    pub domain_rand: Option<DomainRandPatch>,
    pub rewards: Option<RewardsPatch>,
    pub sim: Option<SimPatch>,
    pub terrain: Option<TerrainPatch>,
    pub asset: Option<AssetPatch>,
    pub viewer: Option<ViewerPatch>,
}

impl RobotVariantOverride {
    /// Parse an override document from TOML.
    pub fn from_toml(doc: &str) -> Result<Self, ConfigError> {
        Ok(patch_from_toml(doc)?)
    }
}

impl Overlay for RobotVariantConfig {
    type Patch = RobotVariantOverride;

    fn overlay(&mut self, patch: RobotVariantOverride) {
        if let Some(p) = patch.env {
            self.env.overlay(p);
        }
        if let Some(p) = patch.init_state {
            self.init_state.overlay(p);
        }
        if let Some(p) = patch.control {
            self.control.overlay(p);
        }
        if let Some(p) = patch.normalization {
            self.normalization.overlay(p);
        }
        if let Some(p) = patch.noise {
            self.noise.overlay(p);
        }
        if let Some(p) = patch.commands {
            self.commands.overlay(p);
        }
        if let Some(p) = patch.domain_rand {
            self.domain_rand.overlay(p);
        }
        if let Some(p) = patch.rewards {
            self.rewards.overlay(p);
        }
        if let Some(p) = patch.sim {
            self.sim.overlay(p);
        }
        if let Some(p) = patch.terrain {
            self.terrain.overlay(p);
        }
        if let Some(p) = patch.asset {
            self.asset.overlay(p);
        }
        if let Some(p) = patch.viewer {
            self.viewer.overlay(p);
        }
    }
}

pub mod prelude {
    pub use crate::commands::{CommandRanges, CommandsConfig};
    pub use crate::control::{ControlConfig, ControlType, JointParamTable};
    pub use crate::domain_rand::{DomainRandConfig, RandField, RandSemantics};
    pub use crate::env::{EnvConfig, InitStateConfig, NormalizationConfig, ObservationLayout};
    pub use crate::noise::NoiseConfig;
    pub use crate::rewards::{REGISTERED_TERMS, RewardScales, RewardsConfig};
    pub use crate::sim::{
        AssetConfig, DofDriveMode, MeshType, SimConfig, TerrainConfig, ViewerConfig,
    };
    pub use crate::{RobotVariantConfig, RobotVariantOverride};
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
