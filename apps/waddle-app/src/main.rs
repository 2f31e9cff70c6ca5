//! Waddle variant composition CLI.
//!
//! Provides three modes of operation:
//! - `list`: Print the built-in robot variants
//! - `show`: Compose a variant (plus optional overrides) and print it
//! - `check`: Compose, validate, and resolve the motion set against a root

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use waddle_config::presets;
use waddle_config::{RobotVariantConfig, RobotVariantOverride};
use waddle_core::error::ConfigError;
use waddle_train::presets::training_variant;
use waddle_train::{TrainingVariantConfig, TrainingVariantOverride};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Waddle locomotion training configuration.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the built-in robot variants.
    List,

    /// Compose a variant and print the frozen configuration.
    Show {
        /// Variant name (see `list`).
        variant: String,

        /// TOML override document applied on top of the preset.
        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// TOML override document for the learning side.
        #[arg(long)]
        train_overrides: Option<PathBuf>,

        /// Emit JSON instead of TOML.
        #[arg(long)]
        json: bool,
    },

    /// Compose a variant, validate it, and resolve its motion file set.
    Check {
        /// Variant name (see `list`).
        variant: String,

        /// TOML override document applied on top of the preset.
        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// Repository root for dataset and asset resolution.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Composition helpers
// ---------------------------------------------------------------------------

fn compose_robot(
    name: &str,
    overrides: Option<&Path>,
) -> Result<RobotVariantConfig, ConfigError> {
    let base = presets::variant(name).ok_or_else(|| {
        ConfigError::from(waddle_core::error::FatalConfigError::InvalidValue {
            field: "variant",
            message: format!(
                "unknown variant `{name}`; built-in variants: {}",
                presets::VARIANT_NAMES.join(", ")
            ),
        })
    })?;
    match overrides {
        Some(path) => {
            let doc = std::fs::read_to_string(path)
                .map_err(waddle_core::error::SchemaError::Io)?;
            base.compose(RobotVariantOverride::from_toml(&doc)?)
        }
        None => {
            base.validate()?;
            Ok(base)
        }
    }
}

fn compose_training(
    name: &str,
    robot: &RobotVariantConfig,
    overrides: Option<&Path>,
) -> Result<TrainingVariantConfig, ConfigError> {
    // Every built-in robot variant has a paired learning preset.
    let base = training_variant(name).unwrap_or_default();
    let composed = match overrides {
        Some(path) => {
            let doc = std::fs::read_to_string(path)
                .map_err(waddle_core::error::SchemaError::Io)?;
            base.compose(TrainingVariantOverride::from_toml(&doc)?)?
        }
        None => {
            base.validate()?;
            base
        }
    };
    composed.validate_against(robot)?;
    Ok(composed)
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_list() {
    for name in presets::VARIANT_NAMES {
        println!("{name}");
    }
}

fn run_show(
    variant: &str,
    overrides: Option<&Path>,
    train_overrides: Option<&Path>,
    json: bool,
) -> Result<(), ConfigError> {
    let robot = compose_robot(variant, overrides)?;
    let train = compose_training(variant, &robot, train_overrides)?;

    if json {
        let doc = serde_json::json!({ "robot": robot, "train": train });
        println!("{:#}", doc);
    } else {
        println!("# robot variant `{}`", robot.name);
        print!("{}", toml::to_string_pretty(&robot).map_err(fmt_error)?);
        println!("\n# training variant `{}`", train.name);
        print!("{}", toml::to_string_pretty(&train).map_err(fmt_error)?);
    }
    Ok(())
}

fn run_check(variant: &str, overrides: Option<&Path>, root: &Path) -> Result<(), ConfigError> {
    let robot = compose_robot(variant, overrides)?;
    let train = compose_training(variant, &robot, None)?;
    let motions = robot.resolve_motion_files(root)?;

    println!("variant `{}` ok", robot.name);
    println!(
        "  envs={} actions={} obs={} control_dt={}s",
        robot.env.num_envs,
        robot.env.num_actions,
        robot.env.num_observations,
        robot.control_dt()
    );
    println!("  asset: {}", robot.asset.resolved_file(root).display());
    println!(
        "  runner: {} / {} ({} iterations)",
        train.runner.runner_class_name, train.runner.algorithm_class_name,
        train.runner.max_iterations
    );
    println!("  motion files ({}):", motions.len());
    for file in &motions {
        println!("    {}", file.display());
    }
    Ok(())
}

fn fmt_error(e: toml::ser::Error) -> ConfigError {
    ConfigError::from(waddle_core::error::FatalConfigError::InvalidValue {
        field: "output",
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => {
            run_list();
            Ok(())
        }
        Commands::Show {
            variant,
            overrides,
            train_overrides,
            json,
        } => run_show(
            &variant,
            overrides.as_deref(),
            train_overrides.as_deref(),
            json,
        ),
        Commands::Check {
            variant,
            overrides,
            root,
        } => run_check(&variant, overrides.as_deref(), &root),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
