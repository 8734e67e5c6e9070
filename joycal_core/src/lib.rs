use capture::CaptureError;
use controller::report::ReportError;
use thiserror::Error;

pub mod capture;
pub mod controller;
pub mod crc;
pub mod normalize;

#[derive(Clone, Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

pub type Result<T> = std::result::Result<T, Error>;
