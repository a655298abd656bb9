//! Scene store seam.
//!
//! The host engine owns the scene graph. The rig only needs to find its nodes
//! once and then write transforms and hidden flags to them every frame.

use crate::config::{CameraGeometry, ScenePaths};
use crate::error::{Result, RigError};
use crate::evaluator::RigFrame;
use crate::joint::{JointId, MeshId, NodeTransform};
use glam::{Vec2, Vec3};

/// Opaque reference to a node in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u32);

/// Addressable store of named nodes with mutable transform and visibility.
pub trait SceneStore {
    /// First node with exactly this name
    fn find_first(&self, name: &str) -> Option<NodeHandle>;

    /// Every node matching a `/`-separated pattern, in scene order.
    /// `*` matches one segment, `**` any number of segments.
    fn find_by_path(&self, pattern: &str) -> Vec<NodeHandle>;

    fn set_transform(&mut self, node: NodeHandle, transform: &NodeTransform);

    fn set_hidden(&mut self, node: NodeHandle, hidden: bool);
}

/// Every node the rig drives, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigNodes {
    pub anchor: NodeHandle,
    joints: [NodeHandle; JointId::COUNT],
    meshes: [NodeHandle; MeshId::COUNT],
}

impl RigNodes {
    /// Look up the anchor, joints and meshes. Any missing node is fatal.
    pub fn resolve<S: SceneStore + ?Sized>(store: &S, paths: &ScenePaths) -> Result<Self> {
        let anchor = store.find_first(&paths.anchor).ok_or_else(|| RigError::MissingNode {
            path: paths.anchor.clone(),
        })?;
        let joints = store.find_by_path(&paths.joints);
        let meshes = store.find_by_path(&paths.meshes);
        Self::from_handles(anchor, &joints, &meshes, paths)
    }

    /// Build from handles the host already looked up, in scene order
    pub fn from_handles(
        anchor: NodeHandle,
        joints: &[NodeHandle],
        meshes: &[NodeHandle],
        paths: &ScenePaths,
    ) -> Result<Self> {
        Ok(Self {
            anchor,
            joints: exact(joints, &paths.joints)?,
            meshes: exact(meshes, &paths.meshes)?,
        })
    }

    #[inline]
    pub fn joint(&self, id: JointId) -> NodeHandle {
        self.joints[id.index()]
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> NodeHandle {
        self.meshes[id.index()]
    }

    /// Pin the anchor to the top-left corner of the frame at unit scale
    pub fn pin_anchor<S: SceneStore + ?Sized>(&self, store: &mut S, camera: &CameraGeometry) {
        let transform = NodeTransform::new(camera.anchor_origin(), 0.0, Vec3::ONE);
        store.set_transform(self.anchor, &transform);
    }

    /// Write one evaluated frame to the scene
    pub fn write<S: SceneStore + ?Sized>(&self, store: &mut S, frame: &RigFrame) {
        for joint in JointId::ALL {
            store.set_transform(self.joint(joint), frame.pose.get(joint));
        }
        store.set_transform(self.mesh(MeshId::Glasses), &frame.glasses);
        for mesh in MeshId::ALL {
            store.set_hidden(self.mesh(mesh), frame.visibility.is_hidden(mesh));
        }
    }
}

fn exact<const N: usize>(handles: &[NodeHandle], path: &str) -> Result<[NodeHandle; N]> {
    if handles.is_empty() {
        return Err(RigError::MissingNode { path: path.to_string() });
    }
    handles.try_into().map_err(|_| RigError::NodeCountMismatch {
        path: path.to_string(),
        expected: N,
        found: handles.len(),
    })
}

/// Skeleton child names, in [`JointId`] order
pub const JOINT_NODE_NAMES: [&str; JointId::COUNT] = [
    "chin",
    "r_shoulder",
    "r_elbow_shoulder",
    "r_elbow_wrist",
    "r_wrist",
    "r_hand",
    "l_shoulder",
    "l_elbow_shoulder",
    "l_elbow_wrist",
    "l_wrist",
    "l_hand",
    "r_torso",
    "r_hip_torso",
    "r_hip",
    "r_knee_hip",
    "r_knee_ankle",
    "r_ankle",
    "r_foot",
    "l_torso",
    "l_hip_torso",
    "l_hip",
    "l_knee_hip",
    "l_knee_ankle",
    "l_ankle",
    "l_foot",
];

/// Costume mesh names, in [`MeshId`] order
pub const MESH_NODE_NAMES: [&str; MeshId::COUNT] = [
    "head",
    "glasses",
    "torso",
    "r_arm",
    "r_forearm",
    "r_hand",
    "l_arm",
    "l_forearm",
    "l_hand",
    "r_thigh",
    "r_leg",
    "r_foot",
    "l_thigh",
    "l_leg",
    "l_foot",
];

#[derive(Debug, Clone, PartialEq)]
struct MemoryNode {
    path: String,
    transform: NodeTransform,
    hidden: bool,
}

/// In-memory scene store.
///
/// Used natively and as the mirror the wasm binding fills from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryScene {
    nodes: Vec<MemoryNode>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene laid out the way the body costume ships
    pub fn body_rig() -> Self {
        let mut scene = Self::new();
        scene.add_node("Focal Distance/rigNull");
        let root = "Focal Distance/rigNull/bodyRig";
        for name in JOINT_NODE_NAMES {
            scene.add_node(&format!("{}/Armature/skeleton/{}", root, name));
        }
        for name in MESH_NODE_NAMES {
            scene.add_node(&format!("{}/bodyNull/{}", root, name));
        }
        scene
    }

    pub fn add_node(&mut self, path: &str) -> NodeHandle {
        self.nodes.push(MemoryNode {
            path: path.to_string(),
            transform: NodeTransform::IDENTITY,
            hidden: false,
        });
        NodeHandle(self.nodes.len() as u32 - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn path(&self, node: NodeHandle) -> Option<&str> {
        self.node(node).map(|n| n.path.as_str())
    }

    pub fn transform(&self, node: NodeHandle) -> Option<&NodeTransform> {
        self.node(node).map(|n| &n.transform)
    }

    pub fn position(&self, node: NodeHandle) -> Option<Vec2> {
        self.transform(node).map(|t| t.position)
    }

    pub fn is_hidden(&self, node: NodeHandle) -> Option<bool> {
        self.node(node).map(|n| n.hidden)
    }

    fn node(&self, node: NodeHandle) -> Option<&MemoryNode> {
        self.nodes.get(node.0 as usize)
    }
}

impl SceneStore for MemoryScene {
    fn find_first(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|n| n.path.rsplit('/').next() == Some(name))
            .map(|i| NodeHandle(i as u32))
    }

    fn find_by_path(&self, pattern: &str) -> Vec<NodeHandle> {
        let pattern: Vec<&str> = pattern.split('/').collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                let segments: Vec<&str> = n.path.split('/').collect();
                path_matches(&pattern, &segments)
            })
            .map(|(i, _)| NodeHandle(i as u32))
            .collect()
    }

    fn set_transform(&mut self, node: NodeHandle, transform: &NodeTransform) {
        if let Some(n) = self.nodes.get_mut(node.0 as usize) {
            n.transform = *transform;
        }
    }

    fn set_hidden(&mut self, node: NodeHandle, hidden: bool) {
        if let Some(n) = self.nodes.get_mut(node.0 as usize) {
            n.hidden = hidden;
        }
    }
}

fn path_matches(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|skip| path_matches(rest, &path[skip..])),
        Some((segment, rest)) => match path.split_first() {
            Some((name, tail)) => segment_matches(segment, name) && path_matches(rest, tail),
            None => false,
        },
    }
}

/// Single-segment match where `*` stands for any run of characters
fn segment_matches(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return true;
    };
    for part in middle {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}
