//! Observation noise declarations.
//!
//! Scales are per-signal standard deviations, multiplied by the global
//! `noise_level`; the external environment applies them when `add_noise` is
//! set.

use serde::{Deserialize, Serialize};

use waddle_core::merge::{Overlay, take};

/// Per-signal noise scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseScales {
    pub dof_pos: f32,
    pub dof_vel: f32,
    pub lin_vel: f32,
    pub ang_vel: f32,
    pub gravity: f32,
    pub height_measurements: f32,
}

impl Default for NoiseScales {
    fn default() -> Self {
        Self {
            dof_pos: 0.01,
            dof_vel: 1.5,
            lin_vel: 0.1,
            ang_vel: 0.2,
            gravity: 0.05,
            height_measurements: 0.1,
        }
    }
}

/// Observation noise configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub add_noise: bool,
    /// Global multiplier applied to every scale.
    pub noise_level: f32,
    pub scales: NoiseScales,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            add_noise: true,
            noise_level: 1.0,
            scales: NoiseScales::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoisePatch {
    pub add_noise: Option<bool>,
    pub noise_level: Option<f32>,
    pub scales: Option<NoiseScales>,
}

impl Overlay for NoiseConfig {
    type Patch = NoisePatch;

    fn overlay(&mut self, patch: NoisePatch) {
        take(&mut self.add_noise, patch.add_noise);
        take(&mut self.noise_level, patch.noise_level);
        take(&mut self.scales, patch.scales);
    }
}
