//! Domain randomization declarations.
//!
//! This section only declares toggles and ranges; sampling happens in the
//! external simulator between episodes. Each randomizable quantity has fixed
//! sampling semantics (see [`RandSemantics`]) that consumers must preserve:
//! a friction range of `[0.8, 1.2]` means a factor on the nominal friction,
//! while an added-mass range of `[-0.05, 0.05]` means kilograms added to the
//! base link. Ranges are validated even when their toggle is off, so stale
//! configuration is caught before it is ever enabled.

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

// ---------------------------------------------------------------------------
// RandSemantics
// ---------------------------------------------------------------------------

/// How a sampled value is applied to the nominal parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandSemantics {
    /// Sample is a factor: `actual = nominal * sample`.
    Multiplicative,
    /// Sample is an offset or direct value: `actual = nominal + sample`.
    Additive,
}

/// Randomizable physical quantities, with their fixed semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandField {
    Friction,
    AddedMass,
    ComDisplacement,
    StiffnessMultiplier,
    DampingMultiplier,
    TorqueMultiplier,
    ObsLatency,
}

impl RandField {
    /// The field-to-semantics mapping is fixed; changing it silently changes
    /// what every trained policy experienced.
    #[must_use]
    pub const fn semantics(self) -> RandSemantics {
        match self {
            Self::Friction
            | Self::StiffnessMultiplier
            | Self::DampingMultiplier
            | Self::TorqueMultiplier => RandSemantics::Multiplicative,
            Self::AddedMass | Self::ComDisplacement | Self::ObsLatency => RandSemantics::Additive,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Friction => "domain_rand.friction_range",
            Self::AddedMass => "domain_rand.added_mass_range",
            Self::ComDisplacement => "domain_rand.com_displacement_range",
            Self::StiffnessMultiplier => "domain_rand.stiffness_multiplier_range",
            Self::DampingMultiplier => "domain_rand.damping_multiplier_range",
            Self::TorqueMultiplier => "domain_rand.torque_multiplier_range",
            Self::ObsLatency => "domain_rand.obs_latency_range",
        }
    }
}

// ---------------------------------------------------------------------------
// DomainRandConfig
// ---------------------------------------------------------------------------

/// Per-episode physical parameter perturbation declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRandConfig {
    /// Scale ground friction by a factor in `friction_range`.
    pub randomize_friction: bool,
    pub friction_range: [f32; 2],

    /// Add mass in `added_mass_range` [kg] to the base link.
    pub randomize_base_mass: bool,
    pub added_mass_range: [f32; 2],

    /// Displace the base center of mass by `com_displacement_range` [m].
    pub randomize_com: bool,
    pub com_displacement_range: [f32; 2],

    /// Scale PD gains by factors in the multiplier ranges.
    pub randomize_gains: bool,
    pub stiffness_multiplier_range: [f32; 2],
    pub damping_multiplier_range: [f32; 2],

    /// Scale applied joint torques by a factor in `torque_multiplier_range`.
    pub randomize_torque: bool,
    pub torque_multiplier_range: [f32; 2],

    /// Delay observations by a value in `obs_latency_range` [s].
    pub randomize_obs_latency: bool,
    pub obs_latency_range: [f32; 2],

    /// Periodically shove the robot's base.
    pub push_robots: bool,
    /// Seconds of simulated time between pushes.
    pub push_interval_s: f32,
    /// Maximum horizontal velocity impulse [m/s].
    pub max_push_vel_xy: f32,
}

impl Default for DomainRandConfig {
    fn default() -> Self {
        Self {
            randomize_friction: true,
            friction_range: [0.5, 1.25],
            randomize_base_mass: false,
            added_mass_range: [-1.0, 1.0],
            randomize_com: false,
            com_displacement_range: [-0.05, 0.05],
            randomize_gains: false,
            stiffness_multiplier_range: [0.9, 1.1],
            damping_multiplier_range: [0.9, 1.1],
            randomize_torque: false,
            torque_multiplier_range: [0.9, 1.1],
            randomize_obs_latency: false,
            obs_latency_range: [0.0, 0.02],
            push_robots: true,
            push_interval_s: 15.0,
            max_push_vel_xy: 1.0,
        }
    }
}

impl DomainRandConfig {
    /// All declared ranges with their field tag and enable flag.
    #[must_use]
    pub fn ranges(&self) -> [(RandField, bool, [f32; 2]); 7] {
        [
            (RandField::Friction, self.randomize_friction, self.friction_range),
            (
                RandField::AddedMass,
                self.randomize_base_mass,
                self.added_mass_range,
            ),
            (
                RandField::ComDisplacement,
                self.randomize_com,
                self.com_displacement_range,
            ),
            (
                RandField::StiffnessMultiplier,
                self.randomize_gains,
                self.stiffness_multiplier_range,
            ),
            (
                RandField::DampingMultiplier,
                self.randomize_gains,
                self.damping_multiplier_range,
            ),
            (
                RandField::TorqueMultiplier,
                self.randomize_torque,
                self.torque_multiplier_range,
            ),
            (
                RandField::ObsLatency,
                self.randomize_obs_latency,
                self.obs_latency_range,
            ),
        ]
    }

    pub fn validate(&self) -> Result<(), FatalConfigError> {
        for (field, _enabled, range) in self.ranges() {
            FatalConfigError::check_range(field.name(), range)?;
        }
        if self.push_robots && self.push_interval_s <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "domain_rand.push_interval_s",
                message: format!("must be > 0 when push_robots is set, got {}", self.push_interval_s),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainRandPatch {
    pub randomize_friction: Option<bool>,
    pub friction_range: Option<[f32; 2]>,
    pub randomize_base_mass: Option<bool>,
    pub added_mass_range: Option<[f32; 2]>,
    pub randomize_com: Option<bool>,
    pub com_displacement_range: Option<[f32; 2]>,
    pub randomize_gains: Option<bool>,
    pub stiffness_multiplier_range: Option<[f32; 2]>,
    pub damping_multiplier_range: Option<[f32; 2]>,
    pub randomize_torque: Option<bool>,
    pub torque_multiplier_range: Option<[f32; 2]>,
    pub randomize_obs_latency: Option<bool>,
    pub obs_latency_range: Option<[f32; 2]>,
    pub push_robots: Option<bool>,
    pub push_interval_s: Option<f32>,
    pub max_push_vel_xy: Option<f32>,
}

impl Overlay for DomainRandConfig {
    type Patch = DomainRandPatch;

    fn overlay(&mut self, patch: DomainRandPatch) {
        take(&mut self.randomize_friction, patch.randomize_friction);
        take(&mut self.friction_range, patch.friction_range);
        take(&mut self.randomize_base_mass, patch.randomize_base_mass);
        take(&mut self.added_mass_range, patch.added_mass_range);
        take(&mut self.randomize_com, patch.randomize_com);
        take(&mut self.com_displacement_range, patch.com_displacement_range);
        take(&mut self.randomize_gains, patch.randomize_gains);
        take(
            &mut self.stiffness_multiplier_range,
            patch.stiffness_multiplier_range,
        );
        take(
            &mut self.damping_multiplier_range,
            patch.damping_multiplier_range,
        );
        take(&mut self.randomize_torque, patch.randomize_torque);
        take(
            &mut self.torque_multiplier_range,
            patch.torque_multiplier_range,
        );
        take(&mut self.randomize_obs_latency, patch.randomize_obs_latency);
        take(&mut self.obs_latency_range, patch.obs_latency_range);
        take(&mut self.push_robots, patch.push_robots);
        take(&mut self.push_interval_s, patch.push_interval_s);
        take(&mut self.max_push_vel_xy, patch.max_push_vel_xy);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
