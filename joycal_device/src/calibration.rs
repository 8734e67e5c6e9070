use crate::{
    session::{Session, SessionError},
    transport::HidTransport,
};
use joycal_core::{
    capture::{CalibrationCapture, CalibrationResult, CaptureConfig, CaptureError, Phase},
    controller::{flash::FlashBlock, report::subcommand::InputReportMode},
};
use std::time::Duration;
use thiserror::Error;

const SAMPLE_READ_TIMEOUT: Duration = Duration::from_millis(200);

#[derive(Clone, Error, Debug)]
pub enum CalibrationError {
    #[error("failed to write {block} to flash: {source}")]
    WriteFailed {
        block: FlashBlock,
        #[source]
        source: SessionError,
    },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Runs both capture phases against the live controller.
///
/// Switches the controller to standard input reports first. Returns once the
/// operator has confirmed both phases on the controller; there is no timeout.
#[tracing::instrument(target = "calibration", skip(session))]
pub async fn capture_calibration<T>(
    session: &mut Session<T>,
    config: CaptureConfig,
) -> Result<CalibrationResult, CalibrationError>
where
    T: HidTransport,
{
    session
        .set_input_report_mode(InputReportMode::Standard)
        .await?;
    let mut capture = CalibrationCapture::new(config);
    tracing::info!("sampling stick center and deadzone.");
    while capture.phase() != Phase::Done {
        let Some(report) = session.next_input_report(SAMPLE_READ_TIMEOUT).await? else {
            continue;
        };
        let previous = capture.phase();
        let phase = capture.feed(report.data());
        if phase != previous && phase == Phase::AwaitingRangeSample {
            tracing::info!("sampling stick range.");
        }
    }
    let result = capture.finish()?;
    tracing::info!(
        "captured calibration, left {:?} {:?}, right {:?} {:?}.",
        result.left,
        result.left_params,
        result.right,
        result.right_params
    );
    Ok(result)
}

/// Persists `result` following the connected controller's write plan.
///
/// Stops at the first block that fails; blocks before it stay written.
#[tracing::instrument(target = "calibration", skip(session))]
pub async fn write_calibration<T>(
    session: &mut Session<T>,
    result: &CalibrationResult,
) -> Result<(), CalibrationError>
where
    T: HidTransport,
{
    let kind = session.kind();
    for step in kind.calibration_write_plan() {
        tracing::info!(
            "writing {} for {} at {:#06x}.",
            step.block,
            kind.name(),
            step.address
        );
        let data = result.encode_block(step.block);
        session
            .write_spi(step.address, &data)
            .await
            .map_err(|source| CalibrationError::WriteFailed {
                block: step.block,
                source,
            })?;
    }
    Ok(())
}
