use super::{ControllerKind, StickSide};
use strum::{Display, IntoStaticStr};

// Ref: https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/spi_flash_notes.md
pub const SERIAL_NUMBER_ADDR: u32 = 0x6000;
pub const SERIAL_NUMBER_LEN: usize = 0x10;
pub const LEFT_STICK_CALIBRATION_ADDR: u32 = 0x603D;
pub const RIGHT_STICK_CALIBRATION_ADDR: u32 = 0x6046;
pub const LEFT_STICK_PARAMS_ADDR: u32 = 0x6089;
pub const RIGHT_STICK_PARAMS_ADDR: u32 = 0x609B;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, IntoStaticStr)]
pub enum FlashBlock {
    LeftStickCalibration,
    RightStickCalibration,
    LeftStickParams,
    RightStickParams,
}

impl FlashBlock {
    pub fn side(&self) -> StickSide {
        match self {
            Self::LeftStickCalibration | Self::LeftStickParams => StickSide::Left,
            Self::RightStickCalibration | Self::RightStickParams => StickSide::Right,
        }
    }

    pub fn is_params(&self) -> bool {
        matches!(self, Self::LeftStickParams | Self::RightStickParams)
    }

    // Where the block lives on a controller carrying both sticks.
    pub fn default_address(&self) -> u32 {
        match self {
            Self::LeftStickCalibration => LEFT_STICK_CALIBRATION_ADDR,
            Self::RightStickCalibration => RIGHT_STICK_CALIBRATION_ADDR,
            Self::LeftStickParams => LEFT_STICK_PARAMS_ADDR,
            Self::RightStickParams => RIGHT_STICK_PARAMS_ADDR,
        }
    }

    pub fn calibration(side: StickSide) -> Self {
        match side {
            StickSide::Left => Self::LeftStickCalibration,
            StickSide::Right => Self::RightStickCalibration,
        }
    }

    pub fn params(side: StickSide) -> Self {
        match side {
            StickSide::Left => Self::LeftStickParams,
            StickSide::Right => Self::RightStickParams,
        }
    }
}

/// One step of a calibration write: which block goes to which flash offset.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FlashWrite {
    pub block: FlashBlock,
    pub address: u32,
}

const fn step(block: FlashBlock, address: u32) -> FlashWrite {
    FlashWrite { block, address }
}

static PRO_CONTROLLER_PLAN: [FlashWrite; 4] = [
    step(FlashBlock::RightStickCalibration, RIGHT_STICK_CALIBRATION_ADDR),
    step(FlashBlock::RightStickParams, RIGHT_STICK_PARAMS_ADDR),
    step(FlashBlock::LeftStickCalibration, LEFT_STICK_CALIBRATION_ADDR),
    step(FlashBlock::LeftStickParams, LEFT_STICK_PARAMS_ADDR),
];

static JOYCON_L_PLAN: [FlashWrite; 2] = [
    step(FlashBlock::LeftStickCalibration, LEFT_STICK_CALIBRATION_ADDR),
    step(FlashBlock::LeftStickParams, LEFT_STICK_PARAMS_ADDR),
];

// The right Joy-Con keeps its stick parameters at the left stick's address.
static JOYCON_R_PLAN: [FlashWrite; 2] = [
    step(FlashBlock::RightStickCalibration, RIGHT_STICK_CALIBRATION_ADDR),
    step(FlashBlock::RightStickParams, LEFT_STICK_PARAMS_ADDR),
];

impl ControllerKind {
    /// Ordered flash writes that persist a calibration on this controller.
    pub fn calibration_write_plan(&self) -> &'static [FlashWrite] {
        match self {
            Self::ProController => &PRO_CONTROLLER_PLAN,
            Self::JoyConL => &JOYCON_L_PLAN,
            Self::JoyConR => &JOYCON_R_PLAN,
        }
    }

    pub fn flash_address(&self, block: FlashBlock) -> Option<u32> {
        self.calibration_write_plan()
            .iter()
            .find(|step| step.block == block)
            .map(|step| step.address)
    }
}
