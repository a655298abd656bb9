//! Session driver.
//!
//! Owns the immutable [`RigContext`], the smoothing filters and the resolved
//! scene nodes. The host calls [`RigDriver::update`] from its frame callback;
//! nothing is written to the scene until the nodes have been attached.

use crate::config::{CameraGeometry, Config, ScenePaths};
use crate::error::Result;
use crate::evaluator::{self, RigContext, RigFrame};
use crate::scene::{RigNodes, SceneStore};
use crate::smoothing::PoseFilter;
use crate::tracking::BodyFrame;

pub struct RigDriver {
    ctx: RigContext,
    filter: PoseFilter,
    paths: ScenePaths,
    nodes: Option<RigNodes>,
    last_frame: Option<RigFrame>,
    skipped_frames: u64,
}

impl RigDriver {
    pub fn new(config: &Config, camera: CameraGeometry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: RigContext::new(config, camera),
            filter: PoseFilter::new(camera, config.smoothing_ms, config.reference_distance),
            paths: config.scene.clone(),
            nodes: None,
            last_frame: None,
            skipped_frames: 0,
        })
    }

    pub fn context(&self) -> &RigContext {
        &self.ctx
    }

    pub fn scene_paths(&self) -> &ScenePaths {
        &self.paths
    }

    pub fn nodes(&self) -> Option<&RigNodes> {
        self.nodes.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.nodes.is_some()
    }

    pub fn last_frame(&self) -> Option<&RigFrame> {
        self.last_frame.as_ref()
    }

    /// Resolve the rig's nodes in `store` and pin the anchor.
    ///
    /// Fails without attaching if any node is missing.
    pub fn attach<S: SceneStore + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        let nodes = RigNodes::resolve(store, &self.paths)?;
        self.attach_nodes(nodes, store);
        Ok(())
    }

    /// Attach nodes the host resolved on its own
    pub fn attach_nodes<S: SceneStore + ?Sized>(&mut self, nodes: RigNodes, store: &mut S) {
        nodes.pin_anchor(store, &self.ctx.camera);
        log::info!(
            "Rig attached: anchor pinned at ({}, {}), {} frames skipped before attach",
            self.ctx.camera.anchor_origin().x,
            self.ctx.camera.anchor_origin().y,
            self.skipped_frames
        );
        self.nodes = Some(nodes);
    }

    /// Smooth and evaluate one frame without touching the scene
    pub fn step(&mut self, frame: &BodyFrame) -> RigFrame {
        let smoothed = self.filter.update(frame);
        let rig = evaluator::evaluate(&self.ctx, &smoothed, frame);

        let was_hidden = self.last_frame.map(|f| f.signals.global_hide);
        if was_hidden != Some(rig.signals.global_hide) {
            log::debug!(
                "Global hide {} (closeup: {}, tracked bodies: {})",
                rig.signals.global_hide,
                rig.signals.is_closeup,
                frame.tracked_count
            );
        }

        self.last_frame = Some(rig);
        rig
    }

    /// Evaluate one frame and write it to the scene.
    ///
    /// Returns None, leaving the scene and the filters untouched, until the
    /// rig has been attached.
    pub fn update<S: SceneStore + ?Sized>(
        &mut self,
        store: &mut S,
        frame: &BodyFrame,
    ) -> Option<&RigFrame> {
        if self.nodes.is_none() {
            if self.skipped_frames == 0 {
                log::warn!("Frame received before the rig was attached, skipping");
            }
            self.skipped_frames += 1;
            return None;
        }

        let rig = self.step(frame);
        if let Some(nodes) = &self.nodes {
            nodes.write(store, &rig);
        }
        self.last_frame.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{self, to_scene};
    use crate::joint::{JointId, KeypointId, MeshId, Side};
    use crate::scene::MemoryScene;
    use glam::Vec2;

    fn camera() -> CameraGeometry {
        CameraGeometry::new(1080.0, 1920.0).unwrap()
    }

    fn attached() -> (RigDriver, MemoryScene) {
        let mut scene = MemoryScene::body_rig();
        let mut driver = RigDriver::new(&Config::default(), camera()).unwrap();
        driver.attach(&mut scene).unwrap();
        (driver, scene)
    }

    /// A person standing in the middle of a portrait frame
    fn standing_body(tracked_count: u32) -> BodyFrame {
        let mut frame = BodyFrame::new(tracked_count, 1000.0 / 30.0);
        let points = [
            (KeypointId::TopHead, 0.5, 0.2),
            (KeypointId::Chin, 0.5, 0.3),
            (KeypointId::LeftEye, 0.53, 0.25),
            (KeypointId::RightEye, 0.47, 0.25),
            (KeypointId::LeftShoulder, 0.6, 0.35),
            (KeypointId::LeftElbow, 0.65, 0.45),
            (KeypointId::LeftWrist, 0.68, 0.55),
            (KeypointId::RightShoulder, 0.4, 0.35),
            (KeypointId::RightElbow, 0.35, 0.45),
            (KeypointId::RightWrist, 0.32, 0.55),
            (KeypointId::LeftHip, 0.56, 0.6),
            (KeypointId::RightHip, 0.44, 0.6),
            (KeypointId::LeftKnee, 0.57, 0.75),
            (KeypointId::LeftAnkle, 0.57, 0.9),
            (KeypointId::RightKnee, 0.43, 0.75),
            (KeypointId::RightAnkle, 0.43, 0.9),
        ];
        for (id, x, y) in points {
            frame = frame.with_keypoint(id, Vec2::new(x, y));
        }
        frame
    }

    fn hidden(scene: &MemoryScene, driver: &RigDriver, mesh: MeshId) -> bool {
        let node = driver.nodes().unwrap().mesh(mesh);
        scene.is_hidden(node).unwrap()
    }

    #[test]
    fn test_no_mutation_before_attach() {
        let mut scene = MemoryScene::body_rig();
        let pristine = scene.clone();
        let mut driver = RigDriver::new(&Config::default(), camera()).unwrap();

        assert!(driver.update(&mut scene, &standing_body(1)).is_none());
        assert!(driver.last_frame().is_none());
        assert_eq!(scene, pristine);
    }

    #[test]
    fn test_attach_fails_on_incomplete_scene() {
        let mut scene = MemoryScene::new();
        scene.add_node("rigNull");
        let mut driver = RigDriver::new(&Config::default(), camera()).unwrap();

        assert!(driver.attach(&mut scene).is_err());
        assert!(!driver.is_attached());
        assert!(driver.update(&mut scene, &standing_body(1)).is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            smoothing_ms: -1.0,
            ..Config::default()
        };
        assert!(RigDriver::new(&config, camera()).is_err());
    }

    #[test]
    fn test_head_distance_settles_to_expected_value() {
        let (mut driver, mut scene) = attached();
        let frame = BodyFrame::new(1, 1000.0 / 30.0)
            .with_keypoint(KeypointId::Chin, Vec2::new(0.5, 0.5))
            .with_keypoint(KeypointId::TopHead, Vec2::new(0.5, 0.3));

        let mut head_distance = 0.0;
        for _ in 0..120 {
            head_distance = driver.update(&mut scene, &frame).unwrap().signals.head_distance;
        }

        // 0.2 normalized → /62 → ×600 body scale ×1080 width → ×(1920/1080) ×0.88
        let expected = 0.2 / 62.0 * 600.0 * 1080.0 * (1920.0 / 1080.0) * 0.88;
        assert!(
            (head_distance - expected).abs() / expected < 1e-4,
            "head distance {} expected {}",
            head_distance,
            expected
        );

        let chin = scene.transform(driver.nodes().unwrap().joint(JointId::Chin)).unwrap();
        assert!((chin.scale.x - expected).abs() / expected < 1e-4);
        assert_eq!(chin.position, Vec2::new(540.0, -960.0));
    }

    #[test]
    fn test_standing_body_shows_every_mesh() {
        let (mut driver, mut scene) = attached();
        driver.update(&mut scene, &standing_body(1)).unwrap();

        for mesh in MeshId::ALL {
            assert!(
                !hidden(&scene, &driver, mesh),
                "{:?} should be visible",
                mesh
            );
        }
    }

    #[test]
    fn test_losing_the_body_hides_every_mesh_next_frame() {
        let (mut driver, mut scene) = attached();
        for _ in 0..10 {
            driver.update(&mut scene, &standing_body(1)).unwrap();
        }
        assert!(!hidden(&scene, &driver, MeshId::Torso));

        let rig = driver.update(&mut scene, &standing_body(0)).unwrap();
        assert!(rig.signals.global_hide);
        for mesh in MeshId::ALL {
            assert!(hidden(&scene, &driver, mesh), "{:?} still visible", mesh);
        }

        driver.update(&mut scene, &standing_body(1)).unwrap();
        assert!(!hidden(&scene, &driver, MeshId::LeftLeg));
    }

    #[test]
    fn test_arms_leaving_frame_hide_torso_and_legs() {
        let (mut driver, mut scene) = attached();
        let frame = standing_body(1)
            .with_keypoint(KeypointId::LeftShoulder, Vec2::new(1.2, 0.35))
            .with_keypoint(KeypointId::RightShoulder, Vec2::new(-0.2, 0.35));
        driver.update(&mut scene, &frame).unwrap();

        assert!(hidden(&scene, &driver, MeshId::LeftArm));
        assert!(hidden(&scene, &driver, MeshId::RightArm));
        assert!(hidden(&scene, &driver, MeshId::Torso));
        for side in Side::BOTH {
            assert!(hidden(&scene, &driver, MeshId::thigh(side)));
            assert!(hidden(&scene, &driver, MeshId::leg(side)));
            assert!(hidden(&scene, &driver, MeshId::foot(side)));
        }
        assert!(!hidden(&scene, &driver, MeshId::Head));
    }

    #[test]
    fn test_hand_converges_on_stationary_wrist_and_stays_put() {
        let (mut driver, mut scene) = attached();
        let raised = standing_body(1)
            .with_keypoint(KeypointId::LeftElbow, Vec2::new(0.6, 0.5))
            .with_keypoint(KeypointId::LeftWrist, Vec2::new(0.62, 0.6));
        for _ in 0..5 {
            driver.update(&mut scene, &raised).unwrap();
        }

        let frame = standing_body(1);
        let size = camera().size();
        let elbow = to_scene(frame.keypoint(KeypointId::LeftElbow) * size);
        let wrist = to_scene(frame.keypoint(KeypointId::LeftWrist) * size);
        let expected = geometry::offset_point(elbow, wrist, 0.7);

        let hand_node = driver.nodes().unwrap().joint(JointId::LeftHand);
        let start = scene.transform(hand_node).unwrap().position;
        let mut distances = vec![(start - expected).length()];
        for _ in 0..120 {
            driver.update(&mut scene, &frame).unwrap();
            let hand = scene.transform(hand_node).unwrap().position;
            distances.push((hand - expected).length());
        }

        assert!(distances[0] > 50.0, "hand started at the target");
        for pair in distances[..6].windows(2) {
            assert!(pair[1] < pair[0], "hand not approaching: {:?}", pair);
        }
        for pair in distances.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-3, "hand drifted away: {:?}", pair);
        }
        let last = distances[distances.len() - 1];
        assert!(last < 1e-2, "hand settled {} away from target", last);

        let settled = *scene.transform(hand_node).unwrap();
        driver.update(&mut scene, &frame).unwrap();
        let held = *scene.transform(hand_node).unwrap();
        assert!((held.position - settled.position).length() < 1e-4);

        let wrist_rotation = scene
            .transform(driver.nodes().unwrap().joint(JointId::LeftWrist))
            .unwrap()
            .rotation_z;
        assert_eq!(held.rotation_z, wrist_rotation);
    }

    #[test]
    fn test_nan_keypoint_does_not_break_later_frames() {
        let (mut driver, mut scene) = attached();
        for _ in 0..10 {
            driver.update(&mut scene, &standing_body(1)).unwrap();
        }

        let nan_chin = Vec2::new(f32::NAN, 0.3);
        let broken = standing_body(1).with_keypoint(KeypointId::Chin, nan_chin);
        driver.update(&mut scene, &broken).unwrap();
        for _ in 0..200 {
            driver.update(&mut scene, &standing_body(1)).unwrap();
        }

        let chin_node = driver.nodes().unwrap().joint(JointId::Chin);
        let chin = scene.transform(chin_node).unwrap();
        assert!((chin.position - Vec2::new(540.0, -576.0)).length() < 1e-2);
        assert!(chin.scale.is_finite());
        let signals = driver.last_frame().unwrap().signals;
        assert!(signals.head_distance.is_finite());
        assert!(!hidden(&scene, &driver, MeshId::Head));
    }

    #[test]
    fn test_nan_elapsed_time_does_not_break_later_frames() {
        let (mut driver, mut scene) = attached();
        driver.update(&mut scene, &standing_body(1)).unwrap();

        let stalled = BodyFrame {
            delta_ms: f32::NAN,
            ..standing_body(1)
        };
        driver.update(&mut scene, &stalled).unwrap();
        for _ in 0..10 {
            driver.update(&mut scene, &standing_body(1)).unwrap();
        }

        let rig = *driver.last_frame().unwrap();
        for joint in JointId::ALL {
            let transform = rig.pose.get(joint);
            assert!(transform.position.is_finite(), "{:?} position", joint);
            assert!(transform.rotation_z.is_finite(), "{:?} rotation", joint);
            assert!(transform.scale.is_finite(), "{:?} scale", joint);
        }
        for mesh in MeshId::ALL {
            assert!(!hidden(&scene, &driver, mesh), "{:?} hidden", mesh);
        }
    }

    #[test]
    fn test_step_does_not_need_a_scene() {
        let mut driver = RigDriver::new(&Config::default(), camera()).unwrap();
        let rig = driver.step(&standing_body(1));
        assert!(!rig.visibility.is_hidden(MeshId::Torso));
        assert_eq!(driver.last_frame(), Some(&rig));
    }
}
