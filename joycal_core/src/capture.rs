use crate::controller::{
    calibration::{StickCalibration, StickParams},
    flash::FlashBlock,
    stick::{RawStick, StickSample, STICK_VALUE_MAX},
    StickSide,
};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

// Reports carrying at most this many bytes hold no stick data.
const MIN_SAMPLE_REPORT_LEN: usize = 12;

// Buttons ending the center phase: Y (right byte) or Dpad Left (left byte).
const CENTER_DONE_RIGHT_MASK: u8 = 0x01;
const CENTER_DONE_LEFT_MASK: u8 = 0x08;
// Buttons ending the range phase: A (right byte) or Dpad Right (left byte).
const RANGE_DONE_RIGHT_MASK: u8 = 0x08;
const RANGE_DONE_LEFT_MASK: u8 = 0x04;

/// Outer margin pulled in from each measured bound when the operator asks for
/// a small outer deadzone.
pub const OUTER_PADDING_MARGIN: u16 = 0x050;

#[derive(Clone, Error, Debug, Eq, PartialEq)]
pub enum CaptureError {
    #[error("calibration capture has not finished yet, currently in phase: {0}")]
    NotFinished(Phase),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CaptureConfig {
    // Added on top of the measured deadzone. Defaults to 0.
    pub extra_inner_deadzone: Option<u16>,
    // Pulled in from both ends of the measured range. Defaults to 0, see
    // `OUTER_PADDING_MARGIN` for the usual non-zero choice.
    pub outer_padding: Option<u16>,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, IntoStaticStr)]
pub enum Phase {
    // Operator wiggles the sticks inside the slack area around rest.
    AwaitingCenterSample,
    // Operator spins the sticks along the outer rim.
    AwaitingRangeSample,
    Done,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct AxisBounds {
    min: u16,
    max: u16,
}

impl AxisBounds {
    const EMPTY: Self = Self {
        min: STICK_VALUE_MAX,
        max: 0,
    };

    fn observe(&mut self, value: u16) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn center(&self) -> u16 {
        ((self.min as u32 + self.max as u32) / 2) as u16
    }

    fn half_spread(&self) -> u16 {
        self.max.saturating_sub(self.min) / 2
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct StickBounds {
    x: AxisBounds,
    y: AxisBounds,
}

impl StickBounds {
    const EMPTY: Self = Self {
        x: AxisBounds::EMPTY,
        y: AxisBounds::EMPTY,
    };

    fn observe(&mut self, stick: &RawStick) {
        self.x.observe(stick.horizontal());
        self.y.observe(stick.vertical());
    }

    fn range_ratio(&self) -> u16 {
        self.x
            .max
            .max(self.y.max)
            .saturating_sub(self.x.min.min(self.y.min))
    }
}

/// Turns a stream of standard input reports into a stick calibration.
///
/// Every report with stick data is sampled, including the one carrying the
/// button press that ends the phase.
#[derive(Clone, Debug)]
pub struct CalibrationCapture {
    phase: Phase,
    config: CaptureConfig,
    center: [StickBounds; 2],
    range: [StickBounds; 2],
    samples: usize,
}

impl CalibrationCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            phase: Phase::AwaitingCenterSample,
            config,
            center: [StickBounds::EMPTY; 2],
            range: [StickBounds::EMPTY; 2],
            samples: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // Number of reports sampled in the current phase.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn feed(&mut self, report: &[u8]) -> Phase {
        if report.len() <= MIN_SAMPLE_REPORT_LEN {
            return self.phase;
        }
        let Ok(sample) = StickSample::from_report(report) else {
            return self.phase;
        };
        let (right_buttons, left_buttons) = (report[3], report[5]);
        match self.phase {
            Phase::AwaitingCenterSample => {
                observe(&mut self.center, &sample);
                self.samples += 1;
                if right_buttons & CENTER_DONE_RIGHT_MASK != 0
                    || left_buttons & CENTER_DONE_LEFT_MASK != 0
                {
                    tracing::debug!(samples = self.samples, "center and deadzone phase finished");
                    self.samples = 0;
                    self.phase = Phase::AwaitingRangeSample;
                }
            }
            Phase::AwaitingRangeSample => {
                observe(&mut self.range, &sample);
                self.samples += 1;
                if right_buttons & RANGE_DONE_RIGHT_MASK != 0
                    || left_buttons & RANGE_DONE_LEFT_MASK != 0
                {
                    tracing::debug!(samples = self.samples, "range phase finished");
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => {}
        }
        self.phase
    }

    pub fn finish(&self) -> Result<CalibrationResult, CaptureError> {
        if self.phase != Phase::Done {
            return Err(CaptureError::NotFinished(self.phase));
        }
        let extra_inner = self.config.extra_inner_deadzone.unwrap_or(0);
        let padding = self.config.outer_padding.unwrap_or(0);
        let stick = |index: usize| {
            let center = &self.center[index];
            let range = &self.range[index];
            let calibration = StickCalibration {
                x_min: pad_min(range.x.min, padding),
                x_center: center.x.center(),
                x_max: pad_max(range.x.max, padding),
                y_min: pad_min(range.y.min, padding),
                y_center: center.y.center(),
                y_max: pad_max(range.y.max, padding),
            };
            let params = StickParams {
                deadzone: center
                    .x
                    .half_spread()
                    .saturating_add(extra_inner)
                    .min(STICK_VALUE_MAX),
                range_ratio: range.range_ratio(),
            };
            (calibration, params)
        };
        let (left, left_params) = stick(0);
        let (right, right_params) = stick(1);
        Ok(CalibrationResult {
            left,
            right,
            left_params,
            right_params,
        })
    }
}

fn observe(bounds: &mut [StickBounds; 2], sample: &StickSample) {
    bounds[0].observe(&sample.left);
    bounds[1].observe(&sample.right);
}

fn pad_min(value: u16, padding: u16) -> u16 {
    value.saturating_add(padding).min(STICK_VALUE_MAX)
}

fn pad_max(value: u16, padding: u16) -> u16 {
    value.saturating_sub(padding)
}

/// Calibration for both sticks, ready to be persisted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CalibrationResult {
    pub left: StickCalibration,
    pub right: StickCalibration,
    pub left_params: StickParams,
    pub right_params: StickParams,
}

impl CalibrationResult {
    pub fn max_range() -> Self {
        let params = StickParams {
            deadzone: 0,
            range_ratio: STICK_VALUE_MAX,
        };
        Self {
            left: StickCalibration::MAX_RANGE,
            right: StickCalibration::MAX_RANGE,
            left_params: params,
            right_params: params,
        }
    }

    pub fn calibration(&self, side: StickSide) -> &StickCalibration {
        match side {
            StickSide::Left => &self.left,
            StickSide::Right => &self.right,
        }
    }

    pub fn params(&self, side: StickSide) -> &StickParams {
        match side {
            StickSide::Left => &self.left_params,
            StickSide::Right => &self.right_params,
        }
    }

    // Bytes to persist for the given flash block.
    pub fn encode_block(&self, block: FlashBlock) -> Vec<u8> {
        let side = block.side();
        if block.is_params() {
            self.params(side).to_block().to_vec()
        } else {
            self.calibration(side).to_block(side).to_vec()
        }
    }
}
