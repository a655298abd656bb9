use static_assertions::const_assert_eq;

/// Body side. Left/right rule tables are generated from one function over this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Order an angle reference pair for this side.
    ///
    /// The rig's right arm is authored mirrored, so its pairs run
    /// distal-to-proximal while the left side runs proximal-to-distal.
    #[inline]
    pub const fn orient(
        self,
        proximal: KeypointId,
        distal: KeypointId,
    ) -> (KeypointId, KeypointId) {
        match self {
            Side::Left => (proximal, distal),
            Side::Right => (distal, proximal),
        }
    }
}

/// Tracked 2D body landmark, in the layout of the host's pose2D record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeypointId {
    // Head
    TopHead = 0,
    Chin = 1,
    LeftEye = 2,
    RightEye = 3,

    // Arms
    LeftShoulder = 4,
    LeftElbow = 5,
    LeftWrist = 6,
    RightShoulder = 7,
    RightElbow = 8,
    RightWrist = 9,

    // Torso
    LeftHip = 10,
    RightHip = 11,

    // Legs
    LeftKnee = 12,
    LeftAnkle = 13,
    RightKnee = 14,
    RightAnkle = 15,
}

impl KeypointId {
    pub const COUNT: usize = 16;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const ALL: [KeypointId; Self::COUNT] = [
        KeypointId::TopHead,
        KeypointId::Chin,
        KeypointId::LeftEye,
        KeypointId::RightEye,
        KeypointId::LeftShoulder,
        KeypointId::LeftElbow,
        KeypointId::LeftWrist,
        KeypointId::RightShoulder,
        KeypointId::RightElbow,
        KeypointId::RightWrist,
        KeypointId::LeftHip,
        KeypointId::RightHip,
        KeypointId::LeftKnee,
        KeypointId::LeftAnkle,
        KeypointId::RightKnee,
        KeypointId::RightAnkle,
    ];

    pub const fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftShoulder,
            Side::Right => KeypointId::RightShoulder,
        }
    }

    pub const fn elbow(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftElbow,
            Side::Right => KeypointId::RightElbow,
        }
    }

    pub const fn wrist(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftWrist,
            Side::Right => KeypointId::RightWrist,
        }
    }

    pub const fn hip(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftHip,
            Side::Right => KeypointId::RightHip,
        }
    }

    pub const fn knee(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftKnee,
            Side::Right => KeypointId::RightKnee,
        }
    }

    pub const fn ankle(side: Side) -> Self {
        match side {
            Side::Left => KeypointId::LeftAnkle,
            Side::Right => KeypointId::RightAnkle,
        }
    }
}

/// Rig joint. Discriminants follow the child order under the skeleton node,
/// which is the order the scene lookup returns them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JointId {
    Chin = 0,

    // Right arm chain
    RightShoulder = 1,
    RightElbowShoulder = 2,
    RightElbowWrist = 3,
    RightWrist = 4,
    RightHand = 5,

    // Left arm chain
    LeftShoulder = 6,
    LeftElbowShoulder = 7,
    LeftElbowWrist = 8,
    LeftWrist = 9,
    LeftHand = 10,

    // Right torso and leg chain
    RightTorso = 11,
    RightHipTorso = 12,
    RightHip = 13,
    RightKneeHip = 14,
    RightKneeAnkle = 15,
    RightAnkle = 16,
    RightFoot = 17,

    // Left torso and leg chain
    LeftTorso = 18,
    LeftHipTorso = 19,
    LeftHip = 20,
    LeftKneeHip = 21,
    LeftKneeAnkle = 22,
    LeftAnkle = 23,
    LeftFoot = 24,
}

impl JointId {
    pub const COUNT: usize = 25;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Chin,
        JointId::RightShoulder,
        JointId::RightElbowShoulder,
        JointId::RightElbowWrist,
        JointId::RightWrist,
        JointId::RightHand,
        JointId::LeftShoulder,
        JointId::LeftElbowShoulder,
        JointId::LeftElbowWrist,
        JointId::LeftWrist,
        JointId::LeftHand,
        JointId::RightTorso,
        JointId::RightHipTorso,
        JointId::RightHip,
        JointId::RightKneeHip,
        JointId::RightKneeAnkle,
        JointId::RightAnkle,
        JointId::RightFoot,
        JointId::LeftTorso,
        JointId::LeftHipTorso,
        JointId::LeftHip,
        JointId::LeftKneeHip,
        JointId::LeftKneeAnkle,
        JointId::LeftAnkle,
        JointId::LeftFoot,
    ];

    /// Shoulder anchor on the torso.
    pub const fn torso(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftTorso,
            Side::Right => JointId::RightTorso,
        }
    }

    pub const fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftShoulder,
            Side::Right => JointId::RightShoulder,
        }
    }

    pub const fn elbow_shoulder(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftElbowShoulder,
            Side::Right => JointId::RightElbowShoulder,
        }
    }

    pub const fn elbow_wrist(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftElbowWrist,
            Side::Right => JointId::RightElbowWrist,
        }
    }

    pub const fn wrist(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftWrist,
            Side::Right => JointId::RightWrist,
        }
    }

    pub const fn hand(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftHand,
            Side::Right => JointId::RightHand,
        }
    }

    /// Hip anchor on the torso.
    pub const fn hip_torso(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftHipTorso,
            Side::Right => JointId::RightHipTorso,
        }
    }

    pub const fn hip(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftHip,
            Side::Right => JointId::RightHip,
        }
    }

    pub const fn knee_hip(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftKneeHip,
            Side::Right => JointId::RightKneeHip,
        }
    }

    pub const fn knee_ankle(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftKneeAnkle,
            Side::Right => JointId::RightKneeAnkle,
        }
    }

    pub const fn ankle(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftAnkle,
            Side::Right => JointId::RightAnkle,
        }
    }

    pub const fn foot(side: Side) -> Self {
        match side {
            Side::Left => JointId::LeftFoot,
            Side::Right => JointId::RightFoot,
        }
    }
}

/// Costume mesh whose visibility the rig controls, in scene child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MeshId {
    Head = 0,
    Glasses = 1,
    Torso = 2,
    RightArm = 3,
    RightForearm = 4,
    RightHand = 5,
    LeftArm = 6,
    LeftForearm = 7,
    LeftHand = 8,
    RightThigh = 9,
    RightLeg = 10,
    RightFoot = 11,
    LeftThigh = 12,
    LeftLeg = 13,
    LeftFoot = 14,
}

impl MeshId {
    pub const COUNT: usize = 15;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const ALL: [MeshId; Self::COUNT] = [
        MeshId::Head,
        MeshId::Glasses,
        MeshId::Torso,
        MeshId::RightArm,
        MeshId::RightForearm,
        MeshId::RightHand,
        MeshId::LeftArm,
        MeshId::LeftForearm,
        MeshId::LeftHand,
        MeshId::RightThigh,
        MeshId::RightLeg,
        MeshId::RightFoot,
        MeshId::LeftThigh,
        MeshId::LeftLeg,
        MeshId::LeftFoot,
    ];

    pub const fn arm(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftArm,
            Side::Right => MeshId::RightArm,
        }
    }

    pub const fn forearm(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftForearm,
            Side::Right => MeshId::RightForearm,
        }
    }

    pub const fn hand(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftHand,
            Side::Right => MeshId::RightHand,
        }
    }

    pub const fn thigh(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftThigh,
            Side::Right => MeshId::RightThigh,
        }
    }

    pub const fn leg(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftLeg,
            Side::Right => MeshId::RightLeg,
        }
    }

    pub const fn foot(side: Side) -> Self {
        match side {
            Side::Left => MeshId::LeftFoot,
            Side::Right => MeshId::RightFoot,
        }
    }
}

const_assert_eq!(JointId::COUNT, JointId::LeftFoot as usize + 1);
const_assert_eq!(MeshId::COUNT, MeshId::LeftFoot as usize + 1);
const_assert_eq!(KeypointId::COUNT, KeypointId::RightAnkle as usize + 1);
