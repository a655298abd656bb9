//! Planar helpers over smoothed keypoints.
//!
//! Points passed in here are already smoothed and in scene space: pixels,
//! relative to the top-left of the frame, y inverted so it grows upward.

use crate::joint::{KeypointId, Side};
use glam::Vec2;

/// Distances below this are treated as coincident points
pub const MIN_DISTANCE: f32 = 1e-6;

/// Convert a pixel-space point (y down) into scene space (y up)
#[inline]
pub fn to_scene(pixels: Vec2) -> Vec2 {
    Vec2::new(pixels.x, -pixels.y)
}

/// Convert back from scene space to pixel space
#[inline]
pub fn to_pixels(scene: Vec2) -> Vec2 {
    Vec2::new(scene.x, -scene.y)
}

/// Rotation about the viewing axis of the segment a→b, in radians
#[inline]
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) / 2.0
}

/// Extrapolate past `b` along a→b: `b + (b - a) * multiplier`
#[inline]
pub fn offset_point(a: Vec2, b: Vec2, multiplier: f32) -> Vec2 {
    (b - a) * multiplier + b
}

/// Normalized keypoint distance relative to the calibrated reference distance.
///
/// This is the quantity that gets smoothed before [`scale_factor`] is applied.
/// Coincident points and a degenerate reference both give 0.
pub fn distance_ratio(a: Vec2, b: Vec2, reference_distance: f32) -> f32 {
    let distance = a.distance(b);
    if !distance.is_finite() || distance < MIN_DISTANCE || reference_distance < MIN_DISTANCE {
        return 0.0;
    }
    distance / reference_distance
}

/// Proportional scale from a smoothed distance ratio.
///
/// Grows with the detected limb length and with the camera width, so the
/// costume keeps its proportions across body sizes and preview resolutions.
#[inline]
pub fn scale_factor(smoothed_ratio: f32, body_scale_x: f32, camera_width: f32) -> f32 {
    let factor = smoothed_ratio * body_scale_x * camera_width;
    if factor.is_finite() { factor.max(0.0) } else { 0.0 }
}

/// A keypoint pair whose distance drives a scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleChannel {
    /// Top of head to chin
    Head,
    /// Shoulder to elbow
    UpperArm(Side),
    /// Hip to knee
    Thigh(Side),
}

impl ScaleChannel {
    pub const COUNT: usize = 5;

    pub const ALL: [ScaleChannel; Self::COUNT] = [
        ScaleChannel::Head,
        ScaleChannel::UpperArm(Side::Left),
        ScaleChannel::UpperArm(Side::Right),
        ScaleChannel::Thigh(Side::Left),
        ScaleChannel::Thigh(Side::Right),
    ];

    pub const fn index(self) -> usize {
        match self {
            ScaleChannel::Head => 0,
            ScaleChannel::UpperArm(Side::Left) => 1,
            ScaleChannel::UpperArm(Side::Right) => 2,
            ScaleChannel::Thigh(Side::Left) => 3,
            ScaleChannel::Thigh(Side::Right) => 4,
        }
    }

    pub const fn endpoints(self) -> (KeypointId, KeypointId) {
        match self {
            ScaleChannel::Head => (KeypointId::TopHead, KeypointId::Chin),
            ScaleChannel::UpperArm(side) => (KeypointId::shoulder(side), KeypointId::elbow(side)),
            ScaleChannel::Thigh(side) => (KeypointId::hip(side), KeypointId::knee(side)),
        }
    }
}
