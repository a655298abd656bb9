//! Exponential smoothing of the keypoint streams.
//!
//! Every keypoint coordinate is filtered independently before any geometry is
//! derived from it, and so is every distance ratio that drives a scale factor.
//! The filters are the only state that survives from one frame to the next.

use crate::config::CameraGeometry;
use crate::geometry::{self, ScaleChannel};
use crate::joint::KeypointId;
use crate::tracking::BodyFrame;
use glam::Vec2;

/// Blend weight of the new sample for a damping constant and frame interval.
///
/// A damping of 0 passes samples straight through; larger damping gives a
/// smaller weight, so the output moves more slowly. An elapsed time that is
/// zero, negative or NaN holds the current value.
#[inline]
pub fn blend_weight(damping_ms: f32, delta_ms: f32) -> f32 {
    if damping_ms <= 0.0 {
        return 1.0;
    }
    if delta_ms.is_nan() || delta_ms <= 0.0 {
        return 0.0;
    }
    1.0 - (-delta_ms / damping_ms).exp()
}

/// First-order exponential smoother over a scalar stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSmoother {
    damping_ms: f32,
    value: Option<f32>,
}

impl ExpSmoother {
    pub fn new(damping_ms: f32) -> Self {
        Self {
            damping_ms,
            value: None,
        }
    }

    /// Feed one raw sample and return the smoothed value.
    ///
    /// The first finite sample initializes the output. Non-finite samples are
    /// dropped and the previous value is held (0 before any finite sample).
    pub fn update(&mut self, raw: f32, delta_ms: f32) -> f32 {
        if !raw.is_finite() {
            return self.value.unwrap_or(0.0);
        }
        let next = match self.value {
            None => raw,
            Some(prev) => prev + (raw - prev) * blend_weight(self.damping_ms, delta_ms),
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Smoothed keypoints and scale ratios for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedFrame {
    /// Scene-space positions (pixels, y up)
    positions: [Vec2; KeypointId::COUNT],
    /// Smoothed distance ratios, see [`geometry::distance_ratio`]
    ratios: [f32; ScaleChannel::COUNT],
}

impl SmoothedFrame {
    #[inline]
    pub fn position(&self, id: KeypointId) -> Vec2 {
        self.positions[id.index()]
    }

    #[inline]
    pub fn ratio(&self, channel: ScaleChannel) -> f32 {
        self.ratios[channel.index()]
    }

    /// Build directly from already-smoothed values
    pub fn from_parts(
        positions: [Vec2; KeypointId::COUNT],
        ratios: [f32; ScaleChannel::COUNT],
    ) -> Self {
        Self { positions, ratios }
    }
}

/// Smoothing stage for the whole tracked body.
#[derive(Debug, Clone)]
pub struct PoseFilter {
    camera: CameraGeometry,
    reference_distance: f32,
    x: [ExpSmoother; KeypointId::COUNT],
    y: [ExpSmoother; KeypointId::COUNT],
    ratios: [ExpSmoother; ScaleChannel::COUNT],
}

impl PoseFilter {
    pub fn new(camera: CameraGeometry, damping_ms: f32, reference_distance: f32) -> Self {
        let smoother = ExpSmoother::new(damping_ms);
        Self {
            camera,
            reference_distance,
            x: [smoother; KeypointId::COUNT],
            y: [smoother; KeypointId::COUNT],
            ratios: [smoother; ScaleChannel::COUNT],
        }
    }

    /// Advance every filter by one frame
    pub fn update(&mut self, frame: &BodyFrame) -> SmoothedFrame {
        let dt = frame.delta_ms;

        let mut positions = [Vec2::ZERO; KeypointId::COUNT];
        for id in KeypointId::ALL {
            let i = id.index();
            let pixels = self.camera.to_pixels(frame.keypoint(id));
            let smoothed = Vec2::new(
                self.x[i].update(pixels.x, dt),
                self.y[i].update(pixels.y, dt),
            );
            positions[i] = geometry::to_scene(smoothed);
        }

        let mut ratios = [0.0; ScaleChannel::COUNT];
        for channel in ScaleChannel::ALL {
            let (a, b) = channel.endpoints();
            let raw = geometry::distance_ratio(
                frame.keypoint(a),
                frame.keypoint(b),
                self.reference_distance,
            );
            ratios[channel.index()] = self.ratios[channel.index()].update(raw, dt);
        }

        SmoothedFrame { positions, ratios }
    }

    pub fn reset(&mut self) {
        self.x
            .iter_mut()
            .chain(self.y.iter_mut())
            .chain(self.ratios.iter_mut())
            .for_each(ExpSmoother::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_first_sample_passthrough() {
        let mut s = ExpSmoother::new(50.0);
        assert_eq!(s.value(), None);
        assert_eq!(s.update(42.0, 33.0), 42.0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_zero_damping_tracks_input() {
        let mut s = ExpSmoother::new(0.0);
        s.update(0.0, 33.0);
        assert_eq!(s.update(10.0, 33.0), 10.0);
        assert_eq!(s.update(-3.0, 33.0), -3.0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_zero_elapsed_time_holds_value() {
        let mut s = ExpSmoother::new(50.0);
        s.update(1.0, 33.0);
        assert_eq!(s.update(100.0, 0.0), 1.0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_non_finite_sample_is_dropped() {
        let mut s = ExpSmoother::new(50.0);
        s.update(4.0, 33.0);
        assert_eq!(s.update(f32::NAN, 33.0), 4.0);
        assert_eq!(s.update(f32::INFINITY, 33.0), 4.0);
        assert_eq!(s.update(f32::NEG_INFINITY, 33.0), 4.0);

        let out = s.update(8.0, 33.0);
        assert!(out.is_finite() && out > 4.0 && out < 8.0, "got {}", out);
    }

    #[test]
    fn test_non_finite_first_sample_waits_for_finite_one() {
        let mut s = ExpSmoother::new(50.0);
        assert_eq!(s.update(f32::NAN, 33.0), 0.0);
        assert_eq!(s.value(), None);
        assert_eq!(s.update(7.0, 33.0), 7.0);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_nan_elapsed_time_holds_value() {
        assert_eq!(blend_weight(50.0, f32::NAN), 0.0);

        let mut s = ExpSmoother::new(50.0);
        s.update(1.0, 33.0);
        assert_eq!(s.update(100.0, f32::NAN), 1.0);
        assert!(s.update(100.0, 33.0) > 1.0);
    }

    #[test]
    fn test_pose_filter_recovers_from_nan_keypoint() {
        let camera = CameraGeometry::new(1080.0, 1920.0).unwrap();
        let mut filter = PoseFilter::new(camera, 50.0, 62.0);
        let clean = BodyFrame::new(1, 33.0).with_keypoint(KeypointId::Chin, Vec2::new(0.5, 0.3));
        let broken = clean.with_keypoint(KeypointId::Chin, Vec2::new(f32::NAN, 0.3));

        filter.update(&clean);
        let held = filter.update(&broken);
        let chin = held.position(KeypointId::Chin);
        assert_eq!(chin, Vec2::new(540.0, -576.0));
        assert!(held.ratio(ScaleChannel::Head).is_finite());

        let smoothed = filter.update(&clean);
        let chin = smoothed.position(KeypointId::Chin);
        assert_eq!(chin, Vec2::new(540.0, -576.0));
    }

    #[test]
    fn test_step_blend_matches_time_constant() {
        let mut s = ExpSmoother::new(50.0);
        s.update(0.0, 50.0);
        let out = s.update(1.0, 50.0);
        assert!(approx_eq(out, 1.0 - (-1.0f32).exp(), 1e-6), "got {}", out);
    }

    #[test]
    fn test_converges_to_constant_input() {
        let mut s = ExpSmoother::new(50.0);
        s.update(0.0, 33.0);
        let mut out = 0.0;
        for _ in 0..200 {
            out = s.update(5.0, 33.0);
        }
        assert!(approx_eq(out, 5.0, 1e-4));
    }

    #[test]
    fn test_heavier_damping_moves_slower() {
        let step: Vec<f32> = (0..20).map(|i| if i == 0 { 0.0 } else { 100.0 }).collect();
        let ramp: Vec<f32> = (0..20).map(|i| i as f32 * 10.0).collect();
        let dampings = [0.0, 10.0, 50.0, 200.0, 1000.0];

        let displacement = |inputs: &[f32], damping: f32, frames: usize| {
            let mut s = ExpSmoother::new(damping);
            let start = s.update(inputs[0], 33.0);
            let mut out = start;
            for &raw in &inputs[1..=frames] {
                out = s.update(raw, 33.0);
            }
            out - start
        };

        for (inputs, horizons) in [(&step, &[1, 3][..]), (&ramp, &[1, 5, 19][..])] {
            for &frames in horizons {
                for pair in dampings.windows(2) {
                    let lighter = displacement(inputs, pair[0], frames);
                    let heavier = displacement(inputs, pair[1], frames);
                    assert!(
                        heavier < lighter,
                        "damping {} moved {} but {} moved {} after {} frames",
                        pair[1],
                        heavier,
                        pair[0],
                        lighter,
                        frames
                    );
                }
            }
        }
    }

    #[test]
    fn test_blend_weight_decreases_with_damping() {
        let mut last = blend_weight(0.0, 33.0);
        for damping in [10.0, 50.0, 200.0, 1000.0] {
            let w = blend_weight(damping, 33.0);
            assert!(w < last);
            last = w;
        }
    }

    #[test]
    fn test_pose_filter_converts_to_scene_space() {
        let camera = CameraGeometry::new(1080.0, 1920.0).unwrap();
        let mut filter = PoseFilter::new(camera, 50.0, 62.0);
        let frame = BodyFrame::new(1, 33.0).with_keypoint(KeypointId::Chin, Vec2::new(0.25, 0.5));

        let smoothed = filter.update(&frame);
        let chin = smoothed.position(KeypointId::Chin);
        assert_eq!(chin, Vec2::new(270.0, -960.0));
    }

    #[test]
    fn test_pose_filter_reset_reinitializes() {
        let camera = CameraGeometry::new(100.0, 100.0).unwrap();
        let mut filter = PoseFilter::new(camera, 500.0, 62.0);
        let origin = BodyFrame::new(1, 33.0).with_keypoint(KeypointId::Chin, Vec2::ZERO);
        filter.update(&origin);
        filter.reset();

        let frame = BodyFrame::new(1, 33.0).with_keypoint(KeypointId::Chin, Vec2::ONE);
        let smoothed = filter.update(&frame);
        let chin = smoothed.position(KeypointId::Chin);
        assert_eq!(chin, Vec2::new(100.0, -100.0));
    }
}
