use super::report::ReportError;

pub const STICK_VALUE_MAX: u16 = 0xFFF;

// Byte ranges of the left/right stick triplets inside a standard input report.
const LEFT_STICK_RANGE: std::ops::Range<usize> = 6..9;
const RIGHT_STICK_RANGE: std::ops::Range<usize> = 9..12;

/// Packs two 12-bit values into a triplet.
///
/// `a` takes the low byte and the low nibble of the middle byte, `b` takes the
/// high nibble of the middle byte and the last byte. Bits above 12 are dropped.
pub fn encode_triplet(a: u16, b: u16) -> [u8; 3] {
    let a = a & STICK_VALUE_MAX;
    let b = b & STICK_VALUE_MAX;
    [
        (a & 0xFF) as u8,
        ((a >> 8) as u8) | (((b & 0xF) as u8) << 4),
        (b >> 4) as u8,
    ]
}

pub fn decode_triplet(bytes: &[u8; 3]) -> (u16, u16) {
    let a = (bytes[0] as u16) | (((bytes[1] & 0xF) as u16) << 8);
    let b = ((bytes[1] >> 4) as u16) | ((bytes[2] as u16) << 4);
    (a, b)
}

/// A raw 12-bit stick position as reported by the controller.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RawStick {
    horizontal: u16,
    vertical: u16,
}

impl RawStick {
    pub fn new(horizontal: u16, vertical: u16) -> Result<Self, ReportError> {
        if horizontal > STICK_VALUE_MAX || vertical > STICK_VALUE_MAX {
            return Err(ReportError::InvalidRange);
        }
        Ok(Self {
            horizontal,
            vertical,
        })
    }

    pub fn with_raw(bytes: &[u8; 3]) -> Self {
        let (horizontal, vertical) = decode_triplet(bytes);
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn horizontal(&self) -> u16 {
        self.horizontal
    }

    pub fn vertical(&self) -> u16 {
        self.vertical
    }

    pub fn to_buf(&self) -> [u8; 3] {
        encode_triplet(self.horizontal, self.vertical)
    }
}

/// Both stick positions decoded from a standard (0x30) input report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct StickSample {
    pub left: RawStick,
    pub right: RawStick,
}

impl StickSample {
    pub fn from_report(report: &[u8]) -> Result<Self, ReportError> {
        let (Some(left), Some(right)) = (
            report.get(LEFT_STICK_RANGE),
            report.get(RIGHT_STICK_RANGE),
        ) else {
            return Err(ReportError::TooShort {
                expected: RIGHT_STICK_RANGE.end,
                actual: report.len(),
            });
        };
        Ok(Self {
            left: RawStick::with_raw(&[left[0], left[1], left[2]]),
            right: RawStick::with_raw(&[right[0], right[1], right[2]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_triplet, encode_triplet, RawStick, StickSample};
    use crate::controller::report::ReportError;

    #[test]
    fn triplet_round_trips_every_value() {
        for a in 0..=0xFFFu16 {
            for b in 0..=0xFFFu16 {
                assert_eq!(decode_triplet(&encode_triplet(a, b)), (a, b));
            }
        }
    }

    #[test]
    fn triplet_bit_layout() {
        assert_eq!(encode_triplet(0x123, 0x456), [0x23, 0x61, 0x45]);
        assert_eq!(decode_triplet(&[0x00, 0x08, 0x80]), (0x800, 0x800));
        assert_eq!(encode_triplet(0xFFF, 0x000), [0xFF, 0x0F, 0x00]);
        assert_eq!(encode_triplet(0x000, 0xFFF), [0x00, 0xF0, 0xFF]);
    }

    #[test]
    fn triplet_masks_overflowing_values() {
        assert_eq!(encode_triplet(0x1FFF, 0x1000), encode_triplet(0xFFF, 0x000));
    }

    #[test]
    fn raw_stick_rejects_out_of_range() {
        assert!(matches!(
            RawStick::new(0x1000, 0),
            Err(ReportError::InvalidRange)
        ));
        let stick = RawStick::new(0x7FF, 0x800).unwrap();
        assert_eq!(RawStick::with_raw(&stick.to_buf()), stick);
    }

    #[test]
    fn sample_decodes_standard_report_layout() {
        let mut report = [0u8; 49];
        report[6..9].copy_from_slice(&encode_triplet(0x345, 0xABC));
        report[9..12].copy_from_slice(&encode_triplet(0x001, 0xFFE));
        let sample = StickSample::from_report(&report).unwrap();
        assert_eq!(sample.left.horizontal(), 0x345);
        assert_eq!(sample.left.vertical(), 0xABC);
        assert_eq!(sample.right.horizontal(), 0x001);
        assert_eq!(sample.right.vertical(), 0xFFE);
    }

    #[test]
    fn sample_requires_both_sticks() {
        let err = StickSample::from_report(&[0u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            ReportError::TooShort {
                expected: 12,
                actual: 11
            }
        ));
    }
}
