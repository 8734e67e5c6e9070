use strum::{Display, EnumString, IntoStaticStr};

pub mod calibration;
pub mod flash;
pub mod info;
pub mod report;
pub mod sequence;
pub mod stick;

pub const NINTENDO_VENDOR_ID: u16 = 0x057E;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Display, EnumString, IntoStaticStr,
)]
pub enum ControllerKind {
    JoyConL,
    JoyConR,
    ProController,
}

impl ControllerKind {
    // Order in which a session probes for a connected controller.
    pub const PROBE_ORDER: [ControllerKind; 3] =
        [Self::JoyConL, Self::JoyConR, Self::ProController];

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x01 => Some(Self::JoyConL),
            0x02 => Some(Self::JoyConR),
            0x03 => Some(Self::ProController),
            _ => None,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Self::JoyConL => 0x01,
            Self::JoyConR => 0x02,
            Self::ProController => 0x03,
        }
    }

    pub fn from_product_id(product_id: u16) -> Option<Self> {
        match product_id {
            0x2006 => Some(Self::JoyConL),
            0x2007 => Some(Self::JoyConR),
            0x2009 => Some(Self::ProController),
            _ => None,
        }
    }

    pub fn product_id(&self) -> u16 {
        match self {
            Self::JoyConL => 0x2006,
            Self::JoyConR => 0x2007,
            Self::ProController => 0x2009,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::JoyConL => "Joy-Con (L)",
            Self::JoyConR => "Joy-Con (R)",
            Self::ProController => "Pro Controller",
        }
    }

    pub fn has_stick(&self, side: StickSide) -> bool {
        match (self, side) {
            (Self::ProController, _) => true,
            (Self::JoyConL, StickSide::Left) => true,
            (Self::JoyConR, StickSide::Right) => true,
            _ => false,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Display, EnumString, IntoStaticStr,
)]
pub enum StickSide {
    Left,
    Right,
}
