//! Declarative joint and limb rule tables.
//!
//! Rules are plain data keyed by joint, mesh and keypoint ids. They are built
//! once per session and re-evaluated every frame without being mutated.

use crate::geometry::ScaleChannel;
use crate::joint::{JointId, KeypointId, MeshId, Side};

/// Where a joint's scale comes from each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleRule {
    /// The reference body scale
    Body,
    /// `(body.x, upperArmFactor, 1)`: arm meshes stretch along their length
    Arm(Side),
    /// `(thighFactor, body.x, 1)`: leg meshes stretch across their width
    Leg(Side),
}

/// Mesh driven by a joint rule, optionally gated on another mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBinding {
    pub mesh: MeshId,
    /// Hide this mesh whenever the dependency mesh is hidden
    pub depends_on: Option<MeshId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointRule {
    pub keypoint: KeypointId,
    pub joint: JointId,
    /// Segment whose direction becomes the joint's rotation
    pub angle: Option<(KeypointId, KeypointId)>,
    pub scale: ScaleRule,
    pub mesh: Option<MeshBinding>,
}

impl JointRule {
    fn new(keypoint: KeypointId, joint: JointId, scale: ScaleRule) -> Self {
        Self {
            keypoint,
            joint,
            angle: None,
            scale,
            mesh: None,
        }
    }

    fn angle(mut self, pair: (KeypointId, KeypointId)) -> Self {
        self.angle = Some(pair);
        self
    }

    fn mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(MeshBinding {
            mesh,
            depends_on: None,
        });
        self
    }

    fn mesh_after(mut self, mesh: MeshId, dependency: MeshId) -> Self {
        self.mesh = Some(MeshBinding {
            mesh,
            depends_on: Some(dependency),
        });
        self
    }
}

/// Endpoint joint placed past the end of a tracked segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimbRule {
    pub joint: JointId,
    pub segment_start: JointId,
    pub segment_end: JointId,
    pub multiplier: f32,
}

/// Scale channel sampled by a scale rule, if any
pub const fn scale_channel(rule: ScaleRule) -> Option<ScaleChannel> {
    match rule {
        ScaleRule::Body => None,
        ScaleRule::Arm(side) => Some(ScaleChannel::UpperArm(side)),
        ScaleRule::Leg(side) => Some(ScaleChannel::Thigh(side)),
    }
}

/// Arm rules for one side: torso anchor, shoulder, both elbow joints, wrist.
pub fn arm_rules(side: Side) -> [JointRule; 5] {
    let shoulder = KeypointId::shoulder(side);
    let elbow = KeypointId::elbow(side);
    let wrist = KeypointId::wrist(side);
    let upper = side.orient(shoulder, elbow);
    let lower = side.orient(elbow, wrist);
    let scale = ScaleRule::Arm(side);

    [
        JointRule::new(shoulder, JointId::torso(side), scale),
        JointRule::new(shoulder, JointId::shoulder(side), scale)
            .angle(upper)
            .mesh(MeshId::arm(side)),
        JointRule::new(elbow, JointId::elbow_shoulder(side), scale).angle(upper),
        JointRule::new(elbow, JointId::elbow_wrist(side), scale)
            .angle(lower)
            .mesh(MeshId::forearm(side)),
        JointRule::new(wrist, JointId::wrist(side), scale)
            .angle(lower)
            .mesh(MeshId::hand(side)),
    ]
}

/// Leg rules for one side: both knee joints, ankle, hip anchor, hip.
///
/// Every leg mesh depends on the torso mesh.
pub fn leg_rules(side: Side) -> [JointRule; 5] {
    let knee = KeypointId::knee(side);
    let ankle = KeypointId::ankle(side);
    let hip = KeypointId::hip(side);
    let scale = ScaleRule::Leg(side);

    [
        JointRule::new(knee, JointId::knee_hip(side), scale),
        JointRule::new(knee, JointId::knee_ankle(side), scale)
            .mesh_after(MeshId::leg(side), MeshId::Torso),
        JointRule::new(ankle, JointId::ankle(side), scale)
            .mesh_after(MeshId::foot(side), MeshId::Torso),
        JointRule::new(hip, JointId::hip_torso(side), scale),
        JointRule::new(hip, JointId::hip(side), scale)
            .mesh_after(MeshId::thigh(side), MeshId::Torso),
    ]
}

/// Hand and foot rules for one side.
pub fn limb_rules(side: Side, hand_multiplier: f32, foot_multiplier: f32) -> [LimbRule; 2] {
    [
        LimbRule {
            joint: JointId::hand(side),
            segment_start: JointId::elbow_wrist(side),
            segment_end: JointId::wrist(side),
            multiplier: hand_multiplier,
        },
        LimbRule {
            joint: JointId::foot(side),
            segment_start: JointId::knee_ankle(side),
            segment_end: JointId::ankle(side),
            multiplier: foot_multiplier,
        },
    ]
}

/// All rules of the rig, grouped in evaluation order.
///
/// Arms run before the torso mesh is derived; legs run after it, since their
/// meshes depend on it. Limbs run last, off the evaluated joint transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    pub arms: Vec<JointRule>,
    pub legs: Vec<JointRule>,
    pub limbs: Vec<LimbRule>,
}

impl RuleTable {
    pub fn build(hand_multiplier: f32, foot_multiplier: f32) -> Self {
        Self {
            arms: Side::BOTH.iter().flat_map(|&side| arm_rules(side)).collect(),
            legs: Side::BOTH.iter().flat_map(|&side| leg_rules(side)).collect(),
            limbs: Side::BOTH
                .iter()
                .flat_map(|&side| limb_rules(side, hand_multiplier, foot_multiplier))
                .collect(),
        }
    }

    /// Joint rules in evaluation order
    pub fn joint_rules(&self) -> impl Iterator<Item = &JointRule> {
        self.arms.iter().chain(self.legs.iter())
    }
}
