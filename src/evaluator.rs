//! Per-frame rig evaluation.
//!
//! Turns one smoothed frame into joint transforms and mesh visibility. The
//! whole frame is computed before anything is written to the scene, so every
//! dependent mesh sees the same frame's arm and torso results.

use crate::config::{CameraGeometry, Config};
use crate::geometry::{self, ScaleChannel};
use crate::joint::{JointId, KeypointId, MeshId, MeshVisibility, NodeTransform, RigPose, Side};
use crate::limb;
use crate::rules::{JointRule, RuleTable, ScaleRule};
use crate::smoothing::SmoothedFrame;
use crate::tracking::BodyFrame;
use crate::visibility::{self, FrameSignals, VisibilityPolicy};
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// Immutable session context handed to the evaluator.
#[derive(Debug, Clone)]
pub struct RigContext {
    pub camera: CameraGeometry,
    pub body_scale: Vec3,
    pub eye_roll_gain: f32,
    pub policy: VisibilityPolicy,
    pub rules: RuleTable,
}

impl RigContext {
    pub fn new(config: &Config, camera: CameraGeometry) -> Self {
        Self {
            camera,
            body_scale: config.body_scale,
            eye_roll_gain: config.eye_roll_gain,
            policy: VisibilityPolicy::new(config, camera),
            rules: RuleTable::build(config.hand_multiplier, config.foot_multiplier),
        }
    }

    fn factor(&self, smoothed: &SmoothedFrame, channel: ScaleChannel) -> f32 {
        let ratio = smoothed.ratio(channel);
        geometry::scale_factor(ratio, self.body_scale.x, self.camera.width)
    }

    /// Scale vector of a rule for this frame
    pub fn scale_for(&self, rule: ScaleRule, smoothed: &SmoothedFrame) -> Vec3 {
        match rule {
            ScaleRule::Body => self.body_scale,
            ScaleRule::Arm(side) => Vec3::new(
                self.body_scale.x,
                self.factor(smoothed, ScaleChannel::UpperArm(side)),
                1.0,
            ),
            ScaleRule::Leg(side) => Vec3::new(
                self.factor(smoothed, ScaleChannel::Thigh(side)),
                self.body_scale.x,
                1.0,
            ),
        }
    }
}

/// Everything the rig shows for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigFrame {
    pub pose: RigPose,
    /// The glasses mesh is placed directly, not through a joint
    pub glasses: NodeTransform,
    pub visibility: MeshVisibility,
    pub signals: FrameSignals,
}

impl RigFrame {
    fn new(signals: FrameSignals) -> Self {
        Self {
            pose: RigPose::default(),
            glasses: NodeTransform::IDENTITY,
            visibility: MeshVisibility::all_hidden(),
            signals,
        }
    }
}

/// Head roll from the height difference of the eyes.
///
/// Works on scene-space pixels, so the result is only proportional to the
/// true tilt; the gain is tuned for the shipped costume.
pub fn eye_roll(left_eye: Vec2, right_eye: Vec2, gain: f32) -> f32 {
    (left_eye.y - right_eye.y) * (PI / 180.0) * gain
}

/// Chin joint, glasses mesh, and head/glasses visibility
pub fn apply_head(ctx: &RigContext, smoothed: &SmoothedFrame, out: &mut RigFrame) {
    let chin = smoothed.position(KeypointId::Chin);
    let left_eye = smoothed.position(KeypointId::LeftEye);
    let right_eye = smoothed.position(KeypointId::RightEye);

    let head_distance = out.signals.head_distance;
    let head_scale = Vec3::new(head_distance, head_distance, 1.0);
    let roll = eye_roll(left_eye, right_eye, ctx.eye_roll_gain);

    out.pose.set(JointId::Chin, NodeTransform::new(chin, roll, head_scale));
    let glasses_position = geometry::midpoint(left_eye, right_eye);
    out.glasses = NodeTransform::new(glasses_position, roll, head_scale);

    let hidden = ctx.policy.head_hidden(chin, &out.signals);
    out.visibility.set_hidden(MeshId::Head, hidden);
    out.visibility.set_hidden(MeshId::Glasses, hidden);
}

/// Evaluate one joint rule: position, scale, rotation, then mesh visibility
pub fn apply_joint_rule(
    ctx: &RigContext,
    rule: &JointRule,
    smoothed: &SmoothedFrame,
    out: &mut RigFrame,
) {
    let position = smoothed.position(rule.keypoint);
    let scale = ctx.scale_for(rule.scale, smoothed);
    let rotation_z = rule
        .angle
        .map(|(a, b)| {
            geometry::angle_between(smoothed.position(a), smoothed.position(b))
        })
        .unwrap_or(0.0);

    out.pose.set(rule.joint, NodeTransform::new(position, rotation_z, scale));

    if let Some(binding) = rule.mesh {
        let dependency_hidden = binding
            .depends_on
            .is_some_and(|mesh| out.visibility.is_hidden(mesh));
        let hidden = ctx.policy.mesh_hidden(position, &out.signals, dependency_hidden);
        out.visibility.set_hidden(binding.mesh, hidden);
    }
}

/// Evaluate the full rig for one frame.
///
/// Order: head, arms, torso (from both arms), legs (gated on the torso),
/// then hands and feet from the evaluated joints.
pub fn evaluate(ctx: &RigContext, smoothed: &SmoothedFrame, frame: &BodyFrame) -> RigFrame {
    let signals = ctx.policy.signals(smoothed, frame);
    let mut out = RigFrame::new(signals);

    apply_head(ctx, smoothed, &mut out);

    for rule in &ctx.rules.arms {
        apply_joint_rule(ctx, rule, smoothed, &mut out);
    }

    let torso = visibility::torso_hidden(
        out.visibility.is_hidden(MeshId::arm(Side::Left)),
        out.visibility.is_hidden(MeshId::arm(Side::Right)),
    );
    out.visibility.set_hidden(MeshId::Torso, torso);

    for rule in &ctx.rules.legs {
        apply_joint_rule(ctx, rule, smoothed, &mut out);
    }

    limb::extrapolate_limbs(&ctx.rules.limbs, &mut out.pose, ctx.body_scale);
    out
}
