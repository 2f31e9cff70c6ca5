//! Integration test: full variant composition pipeline.
//!
//! Walks the path a real run takes at bootstrap:
//! 1. Load a built-in preset
//! 2. Merge a file-style TOML override document on top
//! 3. Validate the composed result
//! 4. Resolve the reference-motion set against a dataset root

use std::path::{Path, PathBuf};

use waddle_config::presets;
use waddle_config::{RobotVariantConfig, RobotVariantOverride};
use waddle_core::error::{ConfigError, FatalConfigError};

fn scratch_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("waddle_compose_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_motion(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "0.0 0.0 0.0\n").unwrap();
}

#[test]
fn preset_with_override_composes_and_resolves() {
    let root = scratch_root("full");
    write_motion(
        &root,
        "datasets/bdx/new_placo_moves_faster/bdx_walk_forward_medium.txt",
    );

    let doc = r"
        [env]
        num_envs = 2048

        [domain_rand]
        randomize_friction = true
        friction_range = [0.7, 1.3]

        [commands]
        resampling_time = 5.0
    ";
    let overrides = RobotVariantOverride::from_toml(doc).unwrap();
    let cfg = presets::bdx_amp().compose(overrides).unwrap();

    // Overridden fields.
    assert_eq!(cfg.env.num_envs, 2048);
    assert!(cfg.domain_rand.randomize_friction);
    assert!((cfg.domain_rand.friction_range[1] - 1.3).abs() < f32::EPSILON);
    // Preset fields untouched by the override.
    assert_eq!(cfg.env.num_actions, 15);
    assert!((cfg.control.action_scale - 0.25).abs() < f32::EPSILON);

    let motions = cfg.resolve_motion_files(&root).unwrap();
    assert_eq!(motions.len(), 1);
    assert!(motions.files()[0].is_absolute());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn override_that_breaks_an_invariant_fails_composition() {
    // Shrinking the joint pose map breaks the num_actions cardinality check.
    let doc = r"
        [init_state]
        default_joint_angles = { left_knee = -1.0 }
    ";
    let overrides = RobotVariantOverride::from_toml(doc).unwrap();
    let err = presets::bdx_amp().compose(overrides).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bdx_amp"), "{msg}");
    assert!(msg.contains("num_actions"), "{msg}");
}

#[test]
fn override_with_unknown_field_never_merges() {
    let err = RobotVariantOverride::from_toml("[env]\nnum_evns = 2048").unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
}

#[test]
fn glob_variant_resolves_sorted_library() {
    let root = scratch_root("glob");
    write_motion(&root, "datasets/bdx/new_placo_moves/bdx_walk_fast.txt");
    write_motion(&root, "datasets/bdx/new_placo_moves/bdx_stand.txt");
    write_motion(&root, "datasets/bdx/new_placo_moves/bdx_turn_left.txt");

    let cfg = presets::bdx_amp_rma();
    cfg.validate().unwrap();

    let motions = cfg.resolve_motion_files(&root).unwrap();
    let names: Vec<_> = motions
        .files()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["bdx_stand.txt", "bdx_turn_left.txt", "bdx_walk_fast.txt"]
    );

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn missing_dataset_fails_with_named_file() {
    let root = scratch_root("missing");

    let err = presets::bdx_amp().resolve_motion_files(&root).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bdx_walk_forward_medium.txt"), "{msg}");

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn asset_path_resolves_against_root() {
    let root = scratch_root("asset");
    let cfg = presets::bdx_amp();
    let urdf = cfg.asset.resolved_file(&root);
    assert!(urdf.starts_with(&root));
    assert!(urdf.ends_with("resources/robots/bdx/urdf/bdx.urdf"));
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn empty_glob_library_is_fatal() {
    let root = scratch_root("empty_glob");
    std::fs::create_dir_all(root.join("datasets/bdx/new_placo_moves")).unwrap();

    let err = presets::bdx_amp_rma().resolve_motion_files(&root).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InVariant { source, .. }
            if matches!(*source, ConfigError::Fatal(FatalConfigError::EmptyMotionSet))
    ));

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn composed_variant_round_trips_through_toml_output() {
    // The `show` pipeline: frozen config serializes to a TOML document that
    // names every section.
    let cfg = presets::bdx_amp();
    let doc = toml::to_string_pretty(&cfg).unwrap();
    for section in [
        "[env]",
        "[init_state",
        "[control",
        "[normalization",
        "[noise",
        "[commands",
        "[domain_rand]",
        "[rewards",
        "[sim]",
        "[terrain]",
        "[asset]",
        "[viewer]",
    ] {
        assert!(doc.contains(section), "missing {section}");
    }
}

#[test]
fn default_base_requires_a_full_variant_declaration() {
    // The schema base alone is not a runnable variant: it declares no robot.
    assert!(RobotVariantConfig::default().validate().is_err());
}
