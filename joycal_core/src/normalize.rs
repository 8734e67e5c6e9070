use crate::controller::calibration::StickCalibration;

/// Radius below which a deflection reads as centered.
pub const INNER_DEADZONE: f32 = 0.15;
/// Radius near the rim that reads as full deflection.
pub const OUTER_DEADZONE: f32 = 0.10;

/// Maps a raw stick position onto the unit circle using `[min, center, max]`
/// calibration triplets per axis.
///
/// The result is radially dead-zoned: anything within [`INNER_DEADZONE`] of the
/// center yields exactly `(0.0, 0.0)`, and magnitudes past the outer deadzone
/// saturate at 1.0.
pub fn normalize(raw_x: u16, raw_y: u16, x_cal: [u16; 3], y_cal: [u16; 3]) -> (f32, f32) {
    let x = axis_fraction(raw_x, x_cal);
    let y = axis_fraction(raw_y, y_cal);
    let magnitude = (x * x + y * y).sqrt();
    if magnitude <= INNER_DEADZONE {
        return (0.0, 0.0);
    }
    let legal_range = 1.0 - OUTER_DEADZONE - INNER_DEADZONE;
    let normalized = ((magnitude - INNER_DEADZONE) / legal_range).min(1.0);
    let scale = normalized / magnitude;
    (x * scale, y * scale)
}

// Signed deflection in [-1, 1]. A bound equal to the center contributes 0.
fn axis_fraction(raw: u16, [min, center, max]: [u16; 3]) -> f32 {
    // Not `clamp`, which panics on inverted bounds read from a bad flash block.
    let raw = if raw < min {
        min
    } else if raw > max {
        max
    } else {
        raw
    };
    let offset = raw as i32 - center as i32;
    if raw >= center {
        let span = max as i32 - center as i32;
        if span == 0 {
            return 0.0;
        }
        offset as f32 / span as f32
    } else {
        let span = min as i32 - center as i32;
        if span == 0 {
            return 0.0;
        }
        -(offset as f32 / span as f32)
    }
}

impl StickCalibration {
    pub fn normalize(&self, raw_x: u16, raw_y: u16) -> (f32, f32) {
        normalize(raw_x, raw_y, self.x_axis(), self.y_axis())
    }
}
