use super::{
    report::ReportError,
    stick::{decode_triplet, encode_triplet, STICK_VALUE_MAX},
    StickSide,
};

pub const STICK_CALIBRATION_LEN: usize = 9;
pub const STICK_PARAMS_LEN: usize = 3;

/// Absolute calibration bounds of one analog stick, in raw 12-bit units.
///
/// The normalizer expects `min <= center <= max` on both axes. Values decoded
/// from flash are not checked against this, see [`StickCalibration::is_ordered`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct StickCalibration {
    pub x_min: u16,
    pub x_center: u16,
    pub x_max: u16,
    pub y_min: u16,
    pub y_center: u16,
    pub y_max: u16,
}

impl StickCalibration {
    // Calibration spanning the full 12-bit range, used to flash a "raw"
    // calibration while physically aligning replacement sticks.
    pub const MAX_RANGE: Self = Self {
        x_min: 0,
        x_center: 0x7FF,
        x_max: STICK_VALUE_MAX,
        y_min: 0,
        y_center: 0x7FF,
        y_max: STICK_VALUE_MAX,
    };

    /// `[min, center, max]` of the horizontal axis.
    pub fn x_axis(&self) -> [u16; 3] {
        [self.x_min, self.x_center, self.x_max]
    }

    /// `[min, center, max]` of the vertical axis.
    pub fn y_axis(&self) -> [u16; 3] {
        [self.y_min, self.y_center, self.y_max]
    }

    pub fn is_ordered(&self) -> bool {
        self.x_min <= self.x_center
            && self.x_center <= self.x_max
            && self.y_min <= self.y_center
            && self.y_center <= self.y_max
    }

    fn above_center(&self) -> (u16, u16) {
        (
            self.x_max.saturating_sub(self.x_center),
            self.y_max.saturating_sub(self.y_center),
        )
    }

    fn below_center(&self) -> (u16, u16) {
        (
            self.x_center.saturating_sub(self.x_min),
            self.y_center.saturating_sub(self.y_min),
        )
    }

    // Bounds past either end of the 12-bit range are clamped to it.
    fn from_relative(center: (u16, u16), above: (u16, u16), below: (u16, u16)) -> Self {
        Self {
            x_min: center.0.saturating_sub(below.0),
            x_center: center.0,
            x_max: (center.0 + above.0).min(STICK_VALUE_MAX),
            y_min: center.1.saturating_sub(below.1),
            y_center: center.1,
            y_max: (center.1 + above.1).min(STICK_VALUE_MAX),
        }
    }

    /// Encodes the block in the order the given stick's firmware expects.
    ///
    /// The left stick stores `[max - center, center, center - min]`, the
    /// right stick stores `[center, center - min, max - center]`.
    pub fn to_block(&self, side: StickSide) -> [u8; STICK_CALIBRATION_LEN] {
        let center = (self.x_center, self.y_center);
        let triplets = match side {
            StickSide::Left => [self.above_center(), center, self.below_center()],
            StickSide::Right => [center, self.below_center(), self.above_center()],
        };
        let mut block = [0x00; STICK_CALIBRATION_LEN];
        for (chunk, (a, b)) in block.chunks_exact_mut(3).zip(triplets) {
            chunk.copy_from_slice(&encode_triplet(a, b));
        }
        block
    }

    pub fn with_block(side: StickSide, bytes: &[u8]) -> Result<Self, ReportError> {
        if bytes.len() < STICK_CALIBRATION_LEN {
            return Err(ReportError::TooShort {
                expected: STICK_CALIBRATION_LEN,
                actual: bytes.len(),
            });
        }
        let triplet = |i: usize| decode_triplet(&[bytes[i], bytes[i + 1], bytes[i + 2]]);
        let (first, second, third) = (triplet(0), triplet(3), triplet(6));
        Ok(match side {
            StickSide::Left => Self::from_relative(second, first, third),
            StickSide::Right => Self::from_relative(first, third, second),
        })
    }
}

/// Deadzone and range ratio stored next to a stick's factory calibration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct StickParams {
    pub deadzone: u16,
    pub range_ratio: u16,
}

impl StickParams {
    pub fn to_block(&self) -> [u8; STICK_PARAMS_LEN] {
        encode_triplet(self.deadzone, self.range_ratio)
    }

    pub fn with_block(bytes: &[u8]) -> Result<Self, ReportError> {
        let Some(&[a, b, c]) = bytes.get(..STICK_PARAMS_LEN) else {
            return Err(ReportError::TooShort {
                expected: STICK_PARAMS_LEN,
                actual: bytes.len(),
            });
        };
        let (deadzone, range_ratio) = decode_triplet(&[a, b, c]);
        Ok(Self {
            deadzone,
            range_ratio,
        })
    }
}
