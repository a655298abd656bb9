//! Build script for rig configuration validation
//!
//! This script runs at compile time and validates the bundled rig config
//! so a broken default never ships inside the wasm module.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Subset of the rig config checked at build time. Missing fields fall back
/// to runtime defaults, so they are optional here.
#[derive(Debug, Deserialize)]
struct RigConfig {
    smoothing_ms: Option<f32>,
    body_scale: Option<[f32; 3]>,
    hand_multiplier: Option<f32>,
    foot_multiplier: Option<f32>,
    reference_distance: Option<f32>,
    head_distance_gain: Option<f32>,
    closeup_ratio: Option<f32>,
    closeup_chin_threshold: Option<f32>,
    eye_roll_gain: Option<f32>,
    safe_area_margin: Option<f32>,
    scene: Option<ScenePaths>,
}

#[derive(Debug, Deserialize)]
struct ScenePaths {
    anchor: Option<String>,
    joints: Option<String>,
    meshes: Option<String>,
}

fn below_half(value: f32) -> bool {
    (0.0..0.5).contains(&value)
}

fn validate_config(config: &RigConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let mut check = |name: &str, value: Option<f32>, valid: fn(f32) -> bool, rule: &str| {
        if let Some(value) = value {
            if !value.is_finite() || !valid(value) {
                errors.push(format!("  {}: {} must be {}", name, value, rule));
            }
        }
    };

    check("smoothing_ms", config.smoothing_ms, |v| v >= 0.0, ">= 0");
    let margin = config.safe_area_margin;
    check("safe_area_margin", margin, below_half, "in [0, 0.5)");

    let positive = [
        ("reference_distance", config.reference_distance),
        ("closeup_ratio", config.closeup_ratio),
    ];
    for (name, value) in positive {
        check(name, value, |v| v > 0.0, "> 0");
    }

    let finite = [
        ("hand_multiplier", config.hand_multiplier),
        ("foot_multiplier", config.foot_multiplier),
        ("head_distance_gain", config.head_distance_gain),
        ("closeup_chin_threshold", config.closeup_chin_threshold),
        ("eye_roll_gain", config.eye_roll_gain),
    ];
    for (name, value) in finite {
        check(name, value, |_| true, "finite");
    }

    if let Some(scale) = config.body_scale {
        if scale.iter().any(|v| !v.is_finite() || *v < 0.0) {
            errors.push(format!(
                "  body_scale: {:?} must be finite and non-negative",
                scale
            ));
        }
    }

    if let Some(scene) = &config.scene {
        let paths = [
            ("anchor", &scene.anchor),
            ("joints", &scene.joints),
            ("meshes", &scene.meshes),
        ];
        for (name, value) in paths {
            if value.as_deref().is_some_and(str::is_empty) {
                errors.push(format!("  scene.{}: must not be empty", name));
            }
        }
    }

    errors
}

fn validate_config_file(path: &Path) -> Result<(), String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let config: RigConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let errors = validate_config(&config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Rig config {} is invalid:\n{}",
            path.display(),
            errors.join("\n")
        ))
    }
}

fn main() {
    let config_path = Path::new("assets/rig_config.json");

    // Tell cargo to rerun if the bundled config changes
    println!("cargo:rerun-if-changed={}", config_path.display());

    if let Err(e) = validate_config_file(config_path) {
        println!("cargo:warning=VALIDATION ERROR: {}", e);
        panic!("Rig config validation failed! Fix assets/rig_config.json.");
    }
}
