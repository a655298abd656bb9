//! Per-frame input from the body-tracking provider.

use crate::joint::KeypointId;
use glam::Vec2;

/// Frame interval assumed when the host does not report one (30 fps)
pub const DEFAULT_FRAME_MS: f32 = 1000.0 / 30.0;

/// One sample of the tracked body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    /// Normalized camera-space positions, y grows downward
    pub keypoints: [Vec2; KeypointId::COUNT],
    /// Number of bodies the tracker currently sees
    pub tracked_count: u32,
    /// Milliseconds since the previous frame
    pub delta_ms: f32,
}

impl Default for BodyFrame {
    fn default() -> Self {
        Self {
            keypoints: [Vec2::splat(0.5); KeypointId::COUNT],
            tracked_count: 0,
            delta_ms: DEFAULT_FRAME_MS,
        }
    }
}

impl BodyFrame {
    /// Length of the interleaved x/y buffer accepted by [`BodyFrame::from_flat`]
    pub const FLAT_LEN: usize = KeypointId::COUNT * 2;

    pub fn new(tracked_count: u32, delta_ms: f32) -> Self {
        Self {
            tracked_count,
            delta_ms,
            ..Self::default()
        }
    }

    /// Read keypoints from interleaved x/y pairs in [`KeypointId`] order.
    ///
    /// Returns None unless exactly [`Self::FLAT_LEN`] values are given.
    pub fn from_flat(coords: &[f32], tracked_count: u32, delta_ms: f32) -> Option<Self> {
        if coords.len() != Self::FLAT_LEN {
            return None;
        }
        let mut frame = Self::new(tracked_count, delta_ms);
        for (slot, pair) in frame.keypoints.iter_mut().zip(coords.chunks_exact(2)) {
            *slot = Vec2::new(pair[0], pair[1]);
        }
        Some(frame)
    }

    pub fn with_keypoint(mut self, id: KeypointId, position: Vec2) -> Self {
        self.keypoints[id.index()] = position;
        self
    }

    #[inline]
    pub fn keypoint(&self, id: KeypointId) -> Vec2 {
        self.keypoints[id.index()]
    }

    pub fn is_tracking(&self) -> bool {
        self.tracked_count >= 1
    }
}
