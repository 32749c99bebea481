//! Wire enums for object classification and interaction.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PCode
// ---------------------------------------------------------------------------

/// Object kind discriminant carried by every full and compressed update.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PCode {
    /// No object.
    None,
    /// A primitive.
    Prim,
    /// An avatar.
    Avatar,
    /// A grass patch.
    Grass,
    /// A tree (newer wire code).
    NewTree,
    /// A primitive acting purely as a particle stream source.
    ParticleSystem,
    /// A tree (legacy wire code).
    Tree,
}

impl PCode {
    /// Decodes the wire discriminant. Unknown codes return `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            9 => Some(Self::Prim),
            47 => Some(Self::Avatar),
            95 => Some(Self::Grass),
            111 => Some(Self::NewTree),
            143 => Some(Self::ParticleSystem),
            255 => Some(Self::Tree),
            _ => None,
        }
    }

    /// Returns the wire discriminant.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Prim => 9,
            Self::Avatar => 47,
            Self::Grass => 95,
            Self::NewTree => 111,
            Self::ParticleSystem => 143,
            Self::Tree => 255,
        }
    }

    /// Returns `true` for the foliage kinds (grass and both tree codes).
    pub fn is_foliage(self) -> bool {
        matches!(self, Self::Grass | Self::Tree | Self::NewTree)
    }
}

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// Physical joint attached to a primitive. Joint motion is simulated
/// server-side only; the interpolation engine skips jointed prims.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointType {
    /// No joint.
    #[default]
    None,
    /// Hinge joint.
    Hinge,
    /// Point-to-point joint.
    Point,
}

impl JointType {
    /// Decodes the wire byte. Unrecognized codes decode as `None`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Hinge,
            2 => Self::Point,
            _ => Self::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// Surface material of a primitive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Material {
    /// Stone (wire default).
    #[default]
    Stone,
    /// Metal.
    Metal,
    /// Glass.
    Glass,
    /// Wood.
    Wood,
    /// Flesh.
    Flesh,
    /// Plastic.
    Plastic,
    /// Rubber.
    Rubber,
    /// Light.
    Light,
}

impl Material {
    /// Decodes the wire byte. Unrecognized codes decode as `Stone`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Metal,
            2 => Self::Glass,
            3 => Self::Wood,
            4 => Self::Flesh,
            5 => Self::Plastic,
            6 => Self::Rubber,
            7 => Self::Light,
            _ => Self::Stone,
        }
    }
}

// ---------------------------------------------------------------------------
// ClickAction
// ---------------------------------------------------------------------------

/// Action a viewer performs when the object is clicked.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickAction {
    /// Touch the object.
    #[default]
    Touch,
    /// Sit on the object.
    Sit,
    /// Purchase the object or its contents.
    Buy,
    /// Pay the object.
    Pay,
    /// Open the object's task inventory.
    OpenTask,
    /// Play attached parcel media.
    PlayMedia,
    /// Open attached parcel media.
    OpenMedia,
}

impl ClickAction {
    /// Decodes the wire byte. Unrecognized codes decode as `Touch`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Sit,
            2 => Self::Buy,
            3 => Self::Pay,
            4 => Self::OpenTask,
            5 => Self::PlayMedia,
            6 => Self::OpenMedia,
            _ => Self::Touch,
        }
    }
}

// ---------------------------------------------------------------------------
// Foliage species
// ---------------------------------------------------------------------------

/// Tree species for `Tree`/`NewTree` objects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSpecies {
    Pine1,
    Oak,
    TropicalBush1,
    Palm1,
    Dogwood,
    TropicalBush2,
    Palm2,
    Cypress1,
    Cypress2,
    Pine2,
    Plumeria,
    WinterPine1,
    WinterAspen,
    WinterPine2,
    Eucalyptus,
    Fern,
    Eelgrass,
    SeaSword,
    Kelp1,
    BeachGrass1,
    Kelp2,
}

impl TreeSpecies {
    /// Decodes the wire byte. Unknown species return `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use TreeSpecies::*;
        const TABLE: [TreeSpecies; 21] = [
            Pine1,
            Oak,
            TropicalBush1,
            Palm1,
            Dogwood,
            TropicalBush2,
            Palm2,
            Cypress1,
            Cypress2,
            Pine2,
            Plumeria,
            WinterPine1,
            WinterAspen,
            WinterPine2,
            Eucalyptus,
            Fern,
            Eelgrass,
            SeaSword,
            Kelp1,
            BeachGrass1,
            Kelp2,
        ];
        TABLE.get(value as usize).copied()
    }
}

/// Grass species for `Grass` objects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrassSpecies {
    Grass0,
    Grass1,
    Grass2,
    Grass3,
    Grass4,
    Undergrowth1,
}

impl GrassSpecies {
    /// Decodes the wire byte. Unknown species return `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use GrassSpecies::*;
        const TABLE: [GrassSpecies; 6] = [Grass0, Grass1, Grass2, Grass3, Grass4, Undergrowth1];
        TABLE.get(value as usize).copied()
    }
}

// ---------------------------------------------------------------------------
// AttachmentPoint
// ---------------------------------------------------------------------------

/// Body attachment points for objects worn by avatars. The wire value is
/// packed into the high nibble-swapped state byte of attachment prims.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentPoint {
    /// Right hand if the object was not previously attached.
    #[default]
    Default,
    Chest,
    Skull,
    LeftShoulder,
    RightShoulder,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
    Spine,
    Pelvis,
    Mouth,
    Chin,
    LeftEar,
    RightEar,
    LeftEyeball,
    RightEyeball,
    Nose,
    RightUpperArm,
    RightForearm,
    LeftUpperArm,
    LeftForearm,
    RightHip,
    RightUpperLeg,
    RightLowerLeg,
    LeftHip,
    LeftUpperLeg,
    LeftLowerLeg,
    Stomach,
    LeftPec,
    RightPec,
    HudCenter2,
    HudTopRight,
    HudTop,
    HudTopLeft,
    HudCenter,
    HudBottomLeft,
    HudBottom,
    HudBottomRight,
}

impl AttachmentPoint {
    /// Decodes an attachment point index. Out-of-range values return
    /// `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use AttachmentPoint::*;
        const TABLE: [AttachmentPoint; 39] = [
            Default,
            Chest,
            Skull,
            LeftShoulder,
            RightShoulder,
            LeftHand,
            RightHand,
            LeftFoot,
            RightFoot,
            Spine,
            Pelvis,
            Mouth,
            Chin,
            LeftEar,
            RightEar,
            LeftEyeball,
            RightEyeball,
            Nose,
            RightUpperArm,
            RightForearm,
            LeftUpperArm,
            LeftForearm,
            RightHip,
            RightUpperLeg,
            RightLowerLeg,
            LeftHip,
            LeftUpperLeg,
            LeftLowerLeg,
            Stomach,
            LeftPec,
            RightPec,
            HudCenter2,
            HudTopRight,
            HudTop,
            HudTopLeft,
            HudCenter,
            HudBottomLeft,
            HudBottom,
            HudBottomRight,
        ];
        TABLE.get(value as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcode_round_trip() {
        for code in [
            PCode::None,
            PCode::Prim,
            PCode::Avatar,
            PCode::Grass,
            PCode::NewTree,
            PCode::ParticleSystem,
            PCode::Tree,
        ] {
            assert_eq!(PCode::from_u8(code.as_u8()), Some(code));
        }
        assert_eq!(PCode::from_u8(42), None);
    }

    #[test]
    fn test_foliage_classification() {
        assert!(PCode::Grass.is_foliage());
        assert!(PCode::Tree.is_foliage());
        assert!(PCode::NewTree.is_foliage());
        assert!(!PCode::Prim.is_foliage());
        assert!(!PCode::Avatar.is_foliage());
    }

    #[test]
    fn test_unknown_joint_decodes_as_none() {
        assert_eq!(JointType::from_u8(0), JointType::None);
        assert_eq!(JointType::from_u8(1), JointType::Hinge);
        assert_eq!(JointType::from_u8(2), JointType::Point);
        assert_eq!(JointType::from_u8(200), JointType::None);
    }

    #[test]
    fn test_species_tables() {
        assert_eq!(TreeSpecies::from_u8(0), Some(TreeSpecies::Pine1));
        assert_eq!(TreeSpecies::from_u8(20), Some(TreeSpecies::Kelp2));
        assert_eq!(TreeSpecies::from_u8(21), None);
        assert_eq!(GrassSpecies::from_u8(5), Some(GrassSpecies::Undergrowth1));
        assert_eq!(GrassSpecies::from_u8(6), None);
    }
}
