use calibration::CalibrationError;
use connection::ConnectionError;
use session::SessionError;
use thiserror::Error;
use transport::TransportError;

pub mod calibration;
pub mod connection;
pub mod flash;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Clone, Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

pub type Result<T> = std::result::Result<T, Error>;
