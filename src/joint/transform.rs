use super::id::{JointId, MeshId};
use glam::{Vec2, Vec3};
use static_assertions::assert_eq_size;

/// Planar transform of a scene node.
///
/// Position is in scene pixels relative to the rig anchor (y grows upward),
/// rotation is about the viewing axis in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vec2,
    pub rotation_z: f32,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation_z: 0.0,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec2, rotation_z: f32, scale: Vec3) -> Self {
        Self {
            position,
            rotation_z,
            scale,
        }
    }

    /// Pack for handing to the host as a flat float buffer.
    pub fn to_packed(&self) -> PackedTransform {
        PackedTransform {
            position: self.position.to_array(),
            rotation_z: self.rotation_z,
            scale: self.scale.to_array(),
        }
    }
}

/// Host-facing layout of [`NodeTransform`]: x, y, rotZ, scaleX, scaleY, scaleZ.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedTransform {
    pub position: [f32; 2],
    pub rotation_z: f32,
    pub scale: [f32; 3],
}

assert_eq_size!(PackedTransform, [f32; 6]);

/// Transforms of every rig joint for one frame, indexed by [`JointId`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    pub joints: [NodeTransform; JointId::COUNT],
}

impl Default for RigPose {
    fn default() -> Self {
        Self {
            joints: [NodeTransform::IDENTITY; JointId::COUNT],
        }
    }
}

impl RigPose {
    #[inline]
    pub fn get(&self, joint: JointId) -> &NodeTransform {
        &self.joints[joint.index()]
    }

    #[inline]
    pub fn set(&mut self, joint: JointId, transform: NodeTransform) {
        self.joints[joint.index()] = transform;
    }

    pub fn packed(&self) -> [PackedTransform; JointId::COUNT] {
        self.joints.map(|t| t.to_packed())
    }
}

/// Hidden flag of every costume mesh, indexed by [`MeshId`].
///
/// Starts fully hidden so nothing shows before the first evaluated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshVisibility {
    hidden: [bool; MeshId::COUNT],
}

impl Default for MeshVisibility {
    fn default() -> Self {
        Self::all_hidden()
    }
}

impl MeshVisibility {
    pub fn all_hidden() -> Self {
        Self {
            hidden: [true; MeshId::COUNT],
        }
    }

    #[inline]
    pub fn is_hidden(&self, mesh: MeshId) -> bool {
        self.hidden[mesh.index()]
    }

    #[inline]
    pub fn set_hidden(&mut self, mesh: MeshId, hidden: bool) {
        self.hidden[mesh.index()] = hidden;
    }

    pub fn all_are_hidden(&self) -> bool {
        self.hidden.iter().all(|h| *h)
    }

    /// One byte per mesh, 1 = hidden.
    pub fn to_bytes(&self) -> [u8; MeshId::COUNT] {
        self.hidden.map(u8::from)
    }
}
