//! Hide/show decisions for the costume meshes.
//!
//! A mesh is shown only while its joint sits inside the safe area, the body
//! is tracked, and the head is not filling the frame. Torso and leg meshes
//! additionally follow the arms down the kinematic chain.

use crate::config::{CameraGeometry, Config, SafeArea};
use crate::geometry::{self, ScaleChannel};
use crate::joint::KeypointId;
use crate::smoothing::SmoothedFrame;
use crate::tracking::BodyFrame;
use glam::Vec2;

/// Per-frame scalars shared by every visibility decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSignals {
    /// Head size in scale units, also used as the head/glasses scale
    pub head_distance: f32,
    pub is_closeup: bool,
    pub tracking_lost: bool,
    /// Closeup or tracking lost: every body mesh is hidden
    pub global_hide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityPolicy {
    safe_area: SafeArea,
    camera: CameraGeometry,
    body_scale_x: f32,
    head_distance_gain: f32,
    closeup_ratio: f32,
    closeup_chin_threshold: f32,
}

impl VisibilityPolicy {
    pub fn new(config: &Config, camera: CameraGeometry) -> Self {
        Self {
            safe_area: camera.safe_area(config.safe_area_margin),
            camera,
            body_scale_x: config.body_scale.x,
            head_distance_gain: config.head_distance_gain,
            closeup_ratio: config.closeup_ratio,
            closeup_chin_threshold: config.closeup_chin_threshold,
        }
    }

    pub fn safe_area(&self) -> SafeArea {
        self.safe_area
    }

    /// `scaleFactor(topHead, chin) * (height / width) * gain`
    pub fn head_distance(&self, smoothed: &SmoothedFrame) -> f32 {
        let factor = geometry::scale_factor(
            smoothed.ratio(ScaleChannel::Head),
            self.body_scale_x,
            self.camera.width,
        );
        factor * self.camera.aspect() * self.head_distance_gain
    }

    pub fn signals(&self, smoothed: &SmoothedFrame, frame: &BodyFrame) -> FrameSignals {
        let head_distance = self.head_distance(smoothed);

        let chin_y = frame.keypoint(KeypointId::Chin).y * self.camera.height;
        let chin_low = chin_y > self.camera.height * self.closeup_chin_threshold;
        let is_closeup = head_distance / self.closeup_ratio > self.body_scale_x && chin_low;
        let tracking_lost = !frame.is_tracking();

        FrameSignals {
            head_distance,
            is_closeup,
            tracking_lost,
            global_hide: is_closeup || tracking_lost,
        }
    }

    /// Whether a scene-space joint position lies inside the safe area
    pub fn on_screen(&self, scene_position: Vec2) -> bool {
        self.safe_area.contains(geometry::to_pixels(scene_position))
    }

    /// Hidden flag for a mesh driven by a joint rule
    pub fn mesh_hidden(
        &self,
        scene_position: Vec2,
        signals: &FrameSignals,
        dependency_hidden: bool,
    ) -> bool {
        !self.on_screen(scene_position) || signals.global_hide || dependency_hidden
    }

    /// Hidden flag for the head and glasses meshes.
    ///
    /// Only the chin's placement and tracking loss count here; a closeup keeps
    /// the head visible while it hides the body.
    pub fn head_hidden(&self, chin_scene_position: Vec2, signals: &FrameSignals) -> bool {
        !self.on_screen(chin_scene_position) || signals.tracking_lost
    }
}

/// The torso mesh is hidden once neither upper arm is visible
#[inline]
pub fn torso_hidden(left_arm_hidden: bool, right_arm_hidden: bool) -> bool {
    left_arm_hidden && right_arm_hidden
}
