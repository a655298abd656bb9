//! Hands and feet have no keypoints of their own.
//!
//! They are placed past the wrist/ankle along the already evaluated
//! forearm/shin joints and inherit the end joint's rotation.

use crate::geometry;
use crate::joint::{NodeTransform, RigPose};
use crate::rules::LimbRule;
use glam::Vec3;

/// Transform of one limb endpoint from the evaluated pose
pub fn extrapolate(rule: &LimbRule, pose: &RigPose, body_scale: Vec3) -> NodeTransform {
    let start = pose.get(rule.segment_start);
    let end = pose.get(rule.segment_end);
    NodeTransform::new(
        geometry::offset_point(start.position, end.position, rule.multiplier),
        end.rotation_z,
        body_scale,
    )
}

/// Place every limb endpoint. Must run after all joint rules.
pub fn extrapolate_limbs(rules: &[LimbRule], pose: &mut RigPose, body_scale: Vec3) {
    for rule in rules {
        let transform = extrapolate(rule, pose, body_scale);
        pose.set(rule.joint, transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::{JointId, Side};
    use crate::rules::limb_rules;
    use glam::Vec2;

    #[test]
    fn test_hand_extends_forearm() {
        let mut pose = RigPose::default();
        pose.set(
            JointId::LeftElbowWrist,
            NodeTransform::new(Vec2::new(100.0, -300.0), 0.3, Vec3::ONE),
        );
        pose.set(
            JointId::LeftWrist,
            NodeTransform::new(Vec2::new(200.0, -400.0), 0.75, Vec3::ONE),
        );

        let body_scale = Vec3::new(600.0, 600.0, 1.0);
        extrapolate_limbs(&limb_rules(Side::Left, 0.7, 0.35), &mut pose, body_scale);

        let hand = pose.get(JointId::LeftHand);
        assert!((hand.position - Vec2::new(270.0, -470.0)).length() < 1e-3);
        assert_eq!(hand.rotation_z, 0.75);
        assert_eq!(hand.scale, body_scale);
    }

    #[test]
    fn test_foot_uses_foot_multiplier() {
        let mut pose = RigPose::default();
        pose.set(
            JointId::RightKneeAnkle,
            NodeTransform::new(Vec2::new(0.0, -1000.0), 0.0, Vec3::ONE),
        );
        pose.set(
            JointId::RightAnkle,
            NodeTransform::new(Vec2::new(0.0, -1400.0), -1.2, Vec3::ONE),
        );

        extrapolate_limbs(&limb_rules(Side::Right, 0.7, 0.35), &mut pose, Vec3::ONE);

        let foot = pose.get(JointId::RightFoot);
        assert!((foot.position - Vec2::new(0.0, -1540.0)).length() < 1e-3);
        assert_eq!(foot.rotation_z, -1.2);
    }

    #[test]
    fn test_repeated_extrapolation_is_stable() {
        let mut pose = RigPose::default();
        pose.set(
            JointId::LeftElbowWrist,
            NodeTransform::new(Vec2::new(10.0, -20.0), 0.0, Vec3::ONE),
        );
        pose.set(
            JointId::LeftWrist,
            NodeTransform::new(Vec2::new(30.0, -50.0), 0.0, Vec3::ONE),
        );
        let rules = limb_rules(Side::Left, 0.7, 0.35);

        extrapolate_limbs(&rules, &mut pose, Vec3::ONE);
        let first = *pose.get(JointId::LeftHand);
        extrapolate_limbs(&rules, &mut pose, Vec3::ONE);
        assert_eq!(*pose.get(JointId::LeftHand), first);
    }
}
