use strum::{Display, IntoStaticStr};

// Ref: https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/bluetooth_hid_subcommands_notes.md
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, IntoStaticStr)]
pub enum Subcommand {
    RequestDeviceInfo,
    SetInputReportMode,
    SpiFlashRead,
    SpiFlashWrite,
}

impl Subcommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x02 => Some(Self::RequestDeviceInfo),
            0x03 => Some(Self::SetInputReportMode),
            0x10 => Some(Self::SpiFlashRead),
            0x11 => Some(Self::SpiFlashWrite),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            Self::RequestDeviceInfo => 0x02,
            Self::SetInputReportMode => 0x03,
            Self::SpiFlashRead => 0x10,
            Self::SpiFlashWrite => 0x11,
        }
    }

    // The ack byte the controller answers this subcommand with.
    pub fn ack_byte(&self) -> u8 {
        match self {
            Self::RequestDeviceInfo => 0x82,
            Self::SetInputReportMode => 0x80,
            Self::SpiFlashRead => 0x90,
            Self::SpiFlashWrite => 0x80,
        }
    }

    /// Acknowledgment code of a reply to this subcommand, as read in little
    /// endian from the reply: ack byte first, then the echoed subcommand id.
    pub fn reply_ack(&self) -> u16 {
        u16::from_le_bytes([self.ack_byte(), self.to_byte()])
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, IntoStaticStr)]
pub enum InputReportMode {
    // 0x30 Full input reports with stick/button data pushed at a fixed rate
    Standard,
    // 0x3F Simple HID mode, reports only on button changes
    SimpleHid,
}

impl InputReportMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x30 => Some(Self::Standard),
            0x3F => Some(Self::SimpleHid),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            Self::Standard => 0x30,
            Self::SimpleHid => 0x3F,
        }
    }
}
