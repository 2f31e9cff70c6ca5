//! Velocity/heading command sampling declarations.
//!
//! An external sampler draws a new command uniformly from the active ranges
//! every `resampling_time` seconds of simulated time. The curriculum bound is
//! declared here but progressed by an external controller; this section never
//! widens anything itself.

use serde::{Deserialize, Serialize};

use waddle_core::error::FatalConfigError;
use waddle_core::merge::{Overlay, take};

// ---------------------------------------------------------------------------
// CommandRanges
// ---------------------------------------------------------------------------

/// `[lo, hi]` sampling ranges for each command channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandRanges {
    /// Forward velocity [m/s].
    pub lin_vel_x: [f32; 2],
    /// Lateral velocity [m/s].
    pub lin_vel_y: [f32; 2],
    /// Yaw rate [rad/s].
    pub ang_vel_yaw: [f32; 2],
    /// Heading [rad]; only sampled in heading-command mode.
    pub heading: [f32; 2],
}

impl Default for CommandRanges {
    fn default() -> Self {
        Self {
            lin_vel_x: [-1.0, 1.0],
            lin_vel_y: [-1.0, 1.0],
            ang_vel_yaw: [-1.0, 1.0],
            heading: [-3.14, 3.14],
        }
    }
}

impl CommandRanges {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        FatalConfigError::check_range("commands.ranges.lin_vel_x", self.lin_vel_x)?;
        FatalConfigError::check_range("commands.ranges.lin_vel_y", self.lin_vel_y)?;
        FatalConfigError::check_range("commands.ranges.ang_vel_yaw", self.ang_vel_yaw)?;
        FatalConfigError::check_range("commands.ranges.heading", self.heading)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CommandsConfig
// ---------------------------------------------------------------------------

/// Command sampling and curriculum declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Whether the external curriculum controller may widen the ranges.
    pub curriculum: bool,
    /// Upper bound for curriculum widening, declared only.
    pub max_curriculum: f32,
    /// Number of command channels fed to the policy.
    pub num_commands: usize,
    /// Seconds of simulated time between command resamples.
    pub resampling_time: f32,
    /// When set, yaw rate is derived externally from heading error instead
    /// of sampled directly. This layer only records which mode is active.
    pub heading_command: bool,
    pub ranges: CommandRanges,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            curriculum: false,
            max_curriculum: 1.0,
            num_commands: 3,
            resampling_time: 10.0,
            heading_command: true,
            ranges: CommandRanges::default(),
        }
    }
}

impl CommandsConfig {
    pub fn validate(&self) -> Result<(), FatalConfigError> {
        self.ranges.validate()?;
        if self.resampling_time <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "commands.resampling_time",
                message: format!("must be > 0, got {}", self.resampling_time),
            });
        }
        if self.curriculum && self.max_curriculum <= 0.0 {
            return Err(FatalConfigError::InvalidValue {
                field: "commands.max_curriculum",
                message: format!(
                    "must be > 0 when curriculum is enabled, got {}",
                    self.max_curriculum
                ),
            });
        }
        if self.num_commands == 0 {
            return Err(FatalConfigError::InvalidValue {
                field: "commands.num_commands",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandsPatch {
    pub curriculum: Option<bool>,
    pub max_curriculum: Option<f32>,
    pub num_commands: Option<usize>,
    pub resampling_time: Option<f32>,
    pub heading_command: Option<bool>,
    pub ranges: Option<CommandRanges>,
}

impl Overlay for CommandsConfig {
    type Patch = CommandsPatch;

    fn overlay(&mut self, patch: CommandsPatch) {
        take(&mut self.curriculum, patch.curriculum);
        take(&mut self.max_curriculum, patch.max_curriculum);
        take(&mut self.num_commands, patch.num_commands);
        take(&mut self.resampling_time, patch.resampling_time);
        take(&mut self.heading_command, patch.heading_command);
        // Ranges replace as a block; a variant declares its full envelope.
        take(&mut self.ranges, patch.ranges);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
