//! Session configuration and camera geometry.
//!
//! Both are built once at startup and only read afterwards. The evaluator
//! receives them through [`crate::evaluator::RigContext`] rather than globals.

use crate::error::{Result, RigError};
use glam::{Vec2, Vec3};
use serde::Deserialize;

/// Bundled default configuration, validated by build.rs.
pub const DEFAULT_CONFIG_JSON: &str = include_str!("../assets/rig_config.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Damping time constant of the exponential smoother, in milliseconds
    #[serde(default = "default_smoothing_ms")]
    pub smoothing_ms: f32,
    /// Reference body scale applied to joints without an explicit scale
    #[serde(default = "default_body_scale")]
    pub body_scale: Vec3,
    /// Hand placement past the wrist, as a fraction of the forearm
    #[serde(default = "default_hand_multiplier")]
    pub hand_multiplier: f32,
    /// Foot placement past the ankle, as a fraction of the shin
    #[serde(default = "default_foot_multiplier")]
    pub foot_multiplier: f32,
    /// Keypoint distance that corresponds to the reference body scale
    #[serde(default = "default_reference_distance")]
    pub reference_distance: f32,
    #[serde(default = "default_head_distance_gain")]
    pub head_distance_gain: f32,
    /// Head distance is divided by this before comparing against body scale
    #[serde(default = "default_closeup_ratio")]
    pub closeup_ratio: f32,
    /// Fraction of the frame height the chin must pass for a closeup
    #[serde(default = "default_closeup_chin_threshold")]
    pub closeup_chin_threshold: f32,
    /// Gain applied to the eye-height difference when rolling the head
    #[serde(default = "default_eye_roll_gain")]
    pub eye_roll_gain: f32,
    /// Safe area inset on every edge, as a fraction of the frame size
    #[serde(default = "default_safe_area_margin")]
    pub safe_area_margin: f32,
    #[serde(default)]
    pub scene: ScenePaths,
}

/// Where the rig lives in the host scene.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenePaths {
    #[serde(default = "default_anchor")]
    pub anchor: String,
    #[serde(default = "default_joints_path")]
    pub joints: String,
    #[serde(default = "default_meshes_path")]
    pub meshes: String,
}

fn default_smoothing_ms() -> f32 {
    50.0
}

fn default_body_scale() -> Vec3 {
    Vec3::new(600.0, 600.0, 1.0)
}

fn default_hand_multiplier() -> f32 {
    0.7
}

fn default_foot_multiplier() -> f32 {
    0.35
}

fn default_reference_distance() -> f32 {
    62.0
}

fn default_head_distance_gain() -> f32 {
    0.88
}

fn default_closeup_ratio() -> f32 {
    2.5
}

fn default_closeup_chin_threshold() -> f32 {
    0.7
}

fn default_eye_roll_gain() -> f32 {
    0.85
}

fn default_safe_area_margin() -> f32 {
    0.05
}

fn default_anchor() -> String {
    "rigNull".to_string()
}

fn default_joints_path() -> String {
    "**/bodyRig/Armature/skeleton/*".to_string()
}

fn default_meshes_path() -> String {
    "**/bodyRig/bodyNull/*".to_string()
}

impl Default for ScenePaths {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            joints: default_joints_path(),
            meshes: default_meshes_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            smoothing_ms: default_smoothing_ms(),
            body_scale: default_body_scale(),
            hand_multiplier: default_hand_multiplier(),
            foot_multiplier: default_foot_multiplier(),
            reference_distance: default_reference_distance(),
            head_distance_gain: default_head_distance_gain(),
            closeup_ratio: default_closeup_ratio(),
            closeup_chin_threshold: default_closeup_chin_threshold(),
            eye_roll_gain: default_eye_roll_gain(),
            safe_area_margin: default_safe_area_margin(),
            scene: ScenePaths::default(),
        }
    }
}

impl Config {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration shipped in `assets/rig_config.json`
    pub fn bundled() -> Result<Self> {
        Self::from_json(DEFAULT_CONFIG_JSON)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(RigError::InvalidConfig { message });

        if !self.body_scale.is_finite() || self.body_scale.min_element() < 0.0 {
            return invalid(format!(
                "body_scale must be finite and non-negative, got {}",
                self.body_scale
            ));
        }
        if !self.smoothing_ms.is_finite() || self.smoothing_ms < 0.0 {
            return invalid(format!(
                "smoothing_ms must be >= 0, got {}",
                self.smoothing_ms
            ));
        }
        if !self.reference_distance.is_finite() || self.reference_distance <= 0.0 {
            return invalid(format!(
                "reference_distance must be > 0, got {}",
                self.reference_distance
            ));
        }
        if !self.closeup_ratio.is_finite() || self.closeup_ratio <= 0.0 {
            return invalid(format!(
                "closeup_ratio must be > 0, got {}",
                self.closeup_ratio
            ));
        }
        if !(0.0..0.5).contains(&self.safe_area_margin) {
            return invalid(format!(
                "safe_area_margin must be in [0, 0.5), got {}",
                self.safe_area_margin
            ));
        }

        let gains = [
            ("hand_multiplier", self.hand_multiplier),
            ("foot_multiplier", self.foot_multiplier),
            ("head_distance_gain", self.head_distance_gain),
            ("closeup_chin_threshold", self.closeup_chin_threshold),
            ("eye_roll_gain", self.eye_roll_gain),
        ];
        for (name, value) in gains {
            if !value.is_finite() {
                return invalid(format!("{} must be finite, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// Preview surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraGeometry {
    pub width: f32,
    pub height: f32,
}

impl CameraGeometry {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RigError::InvalidCamera { width, height });
        }
        Ok(Self { width, height })
    }

    /// Build from the host's preview size and display-scale divisor
    pub fn from_preview(
        preview_width: f32,
        preview_height: f32,
        screen_scale: f32,
    ) -> Result<Self> {
        Self::new(preview_width / screen_scale, preview_height / screen_scale)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Map a normalized keypoint into pixel space (y still grows downward)
    #[inline]
    pub fn to_pixels(&self, normalized: Vec2) -> Vec2 {
        normalized * self.size()
    }

    pub fn aspect(&self) -> f32 {
        self.height / self.width
    }

    pub fn safe_area(&self, margin: f32) -> SafeArea {
        SafeArea {
            min: self.size() * margin,
            max: self.size() * (1.0 - margin),
        }
    }

    /// Top-left corner of the frame in scene space, where the rig anchor sits
    pub fn anchor_origin(&self) -> Vec2 {
        Vec2::new(-self.width / 2.0, self.height / 2.0)
    }
}

/// Central rectangle of the frame in pixel space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl SafeArea {
    /// Open-interval containment on both axes
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }
}
