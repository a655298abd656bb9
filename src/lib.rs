//! Body Rig - Wasm Core
//!
//! Drives a 2D skeletal costume rig from per-frame body-tracking keypoints:
//! smoothing, joint transforms, hand/foot extrapolation and mesh visibility.

pub mod config;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod joint;
pub mod limb;
pub mod rules;
pub mod scene;
pub mod smoothing;
pub mod tracking;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
mod bindings;

#[cfg(target_arch = "wasm32")]
pub use bindings::{init_logging, RigSession};

pub use config::{CameraGeometry, Config, SafeArea, ScenePaths};
pub use driver::RigDriver;
pub use error::{Result, RigError};
pub use evaluator::{RigContext, RigFrame};
pub use joint::{JointId, KeypointId, MeshId, MeshVisibility, NodeTransform, RigPose, Side};
pub use scene::{MemoryScene, NodeHandle, RigNodes, SceneStore};
pub use tracking::BodyFrame;

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[test]
    #[wasm_bindgen_test]
    fn test_bundled_session_runs_end_to_end() {
        let config = Config::bundled().unwrap();
        let camera = CameraGeometry::from_preview(2160.0, 3840.0, 2.0).unwrap();
        let mut scene = MemoryScene::body_rig();
        let mut driver = RigDriver::new(&config, camera).unwrap();
        driver.attach(&mut scene).unwrap();

        let frame = BodyFrame::from_flat(&[0.5; BodyFrame::FLAT_LEN], 1, 33.0).unwrap();
        let rig = *driver.update(&mut scene, &frame).unwrap();

        // Every keypoint on one spot: no segment lengths, no scale
        assert_eq!(rig.signals.head_distance, 0.0);
        assert!(!rig.signals.global_hide);
        assert!(!rig.visibility.is_hidden(MeshId::Torso));
    }
}
