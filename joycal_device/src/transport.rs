use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum TransportError {
    #[error("transport wrote {written} of {expected} bytes")]
    PartialWrite { expected: usize, written: usize },
    #[error("internal error: {0}")]
    Internal(TransportInternalError),
}

#[derive(Clone, Error, Debug)]
pub enum TransportInternalError {
    #[error("io: {kind}; {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(TransportInternalError::Io {
            kind: err.kind(),
            message: err.to_string(),
        })
    }
}

/// An opened HID handle to a single controller.
///
/// Implementations wrap whatever HID library the host provides. The session
/// owns the transport exclusively and never issues overlapping calls.
#[async_trait]
pub trait HidTransport: Send + Sync {
    /// Writes one complete output report, returning the number of bytes
    /// accepted by the device.
    async fn write(&self, buf: &[u8]) -> std::io::Result<usize>;

    /// Reads one input report into `buf`.
    ///
    /// Returns `Ok(0)` when nothing arrived within `timeout`.
    async fn read_timeout(&self, buf: &mut [u8], timeout: Duration) -> std::io::Result<usize>;
}

#[async_trait]
pub trait HidOpener: Send + Sync {
    type Transport: HidTransport;

    // `Ok(None)` when no device with the given ids is attached.
    async fn open(
        &self,
        vendor_id: u16,
        product_id: u16,
    ) -> std::io::Result<Option<Self::Transport>>;
}
