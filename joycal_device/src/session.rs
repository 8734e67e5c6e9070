use crate::transport::{HidTransport, TransportError};
use bytes::BytesMut;
use joycal_core::controller::{
    info::DeviceInfo,
    report::{
        input::{InputReport, INPUT_REPORT_MAX_LEN},
        output::OutputReport,
        subcommand::{InputReportMode, Subcommand},
        ReportError,
    },
    sequence::SequenceCounter,
    ControllerKind,
};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SPI_READ_ATTEMPTS: u32 = 64;
const DEFAULT_WRITE_SETTLE_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_REPLY_BUF_SIZE: usize = INPUT_REPORT_MAX_LEN;

const SPI_READ_TIMEOUT: Duration = Duration::from_millis(200);
const BOUNDED_ATTEMPTS: u32 = 20;
const BOUNDED_READS_PER_ATTEMPT: u32 = 8;
const BOUNDED_READ_TIMEOUT: Duration = Duration::from_millis(64);
const MODE_SWITCH_READ_TIMEOUT: Duration = Duration::from_millis(120);

#[derive(Clone, Error, Debug)]
pub enum SessionError {
    #[error("no matching reply after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("unexpected acknowledgment, expected {expected:#06x} but got {actual:?}")]
    AckMismatch { expected: u16, actual: Option<u16> },
    #[error("reply does not echo the requested flash range at {offset:#x} ({size} bytes)")]
    EchoMismatch { offset: u32, size: u8 },
    #[error("reply too short, expected at least {expected} bytes but got {actual}")]
    ShortRead { expected: usize, actual: usize },
    #[error("retry budget exhausted after {attempts} attempts")]
    RetryBudgetExhausted { attempts: u32 },
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.into())
    }
}

// A reply that cannot hold the requested payload is a short read, not a
// malformed report.
pub(crate) fn short_read(err: ReportError) -> SessionError {
    match err {
        ReportError::TooShort { expected, actual } => SessionError::ShortRead { expected, actual },
        err => err.into(),
    }
}

/// How a reply is correlated with the command that was sent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyMatch {
    Ack(u16),
    // SPI read replies must also echo the requested offset and size.
    SpiRead { offset: u32, size: u8 },
}

impl ReplyMatch {
    pub fn expected_ack(&self) -> u16 {
        match self {
            Self::Ack(ack) => *ack,
            Self::SpiRead { .. } => Subcommand::SpiFlashRead.reply_ack(),
        }
    }

    pub fn check(&self, reply: &InputReport) -> Result<(), SessionError> {
        let expected = self.expected_ack();
        let actual = reply.ack();
        if actual != Some(expected) {
            return Err(SessionError::AckMismatch { expected, actual });
        }
        if let Self::SpiRead { offset, size } = *self {
            if reply.spi_read_echo() != Some((offset, size)) {
                return Err(SessionError::EchoMismatch { offset, size });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpiReadLimit {
    Attempts(u32),
    // Resends until the controller answers. Can block forever.
    Unbounded,
}

impl Default for SpiReadLimit {
    fn default() -> Self {
        Self::Attempts(DEFAULT_SPI_READ_ATTEMPTS)
    }
}

/// Retry budget of a single command exchange.
///
/// Each attempt sends the command once and then reads up to
/// `reads_per_attempt` replies. A read that times out ends the attempt early.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    // `None` keeps resending until a matching reply arrives.
    pub attempts: Option<u32>,
    pub reads_per_attempt: u32,
    pub read_timeout: Duration,
}

impl RetryPolicy {
    pub fn spi_read(limit: SpiReadLimit) -> Self {
        Self {
            attempts: match limit {
                SpiReadLimit::Attempts(attempts) => Some(attempts),
                SpiReadLimit::Unbounded => None,
            },
            reads_per_attempt: 1,
            read_timeout: SPI_READ_TIMEOUT,
        }
    }

    // Device info and serial number queries.
    pub fn bounded_query() -> Self {
        Self {
            attempts: Some(BOUNDED_ATTEMPTS),
            reads_per_attempt: BOUNDED_READS_PER_ATTEMPT,
            read_timeout: BOUNDED_READ_TIMEOUT,
        }
    }

    pub fn spi_write() -> Self {
        Self {
            attempts: Some(BOUNDED_ATTEMPTS),
            reads_per_attempt: BOUNDED_READS_PER_ATTEMPT,
            read_timeout: BOUNDED_READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionConfig {
    pub spi_read_limit: Option<SpiReadLimit>,
    pub write_settle_delay: Option<Duration>,
    pub reply_buf_size: Option<usize>,
}

/// Exclusive command session with one connected controller.
///
/// Every operation borrows the session mutably and runs to completion, so
/// exchanges are never interleaved.
#[derive(Debug)]
pub struct Session<T>
where
    T: HidTransport,
{
    transport: T,
    kind: ControllerKind,
    sequence: SequenceCounter,
    spi_read_limit: SpiReadLimit,
    write_settle_delay: Duration,
    reply_buf_size: usize,
}

impl<T> Session<T>
where
    T: HidTransport,
{
    #[tracing::instrument(target = "session", skip(transport))]
    pub fn new(transport: T, kind: ControllerKind, config: SessionConfig) -> Self {
        tracing::info!("starting a session with {}.", kind.name());
        Self {
            transport,
            kind,
            sequence: SequenceCounter::new(),
            spi_read_limit: config.spi_read_limit.unwrap_or_default(),
            write_settle_delay: config
                .write_settle_delay
                .unwrap_or(DEFAULT_WRITE_SETTLE_DELAY),
            reply_buf_size: config
                .reply_buf_size
                .unwrap_or(DEFAULT_REPLY_BUF_SIZE)
                .max(1),
        }
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn sequence(&self) -> SequenceCounter {
        self.sequence
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub(crate) fn spi_read_limit(&self) -> SpiReadLimit {
        self.spi_read_limit
    }

    pub(crate) fn write_settle_delay(&self) -> Duration {
        self.write_settle_delay
    }

    /// Stamps the next timer value into the frame and writes it.
    pub async fn send(&mut self, report: &mut OutputReport) -> Result<(), SessionError> {
        report.set_timer(self.sequence.next());
        let expected = report.data().len();
        let written = self.transport.write(report.data()).await?;
        if written < expected {
            return Err(TransportError::PartialWrite { expected, written }.into());
        }
        tracing::trace!(
            timer = report.timer(),
            written,
            "sent {:?}.",
            report.subcommand()
        );
        Ok(())
    }

    /// Reads the next report from the controller, or `None` on timeout.
    pub async fn next_input_report(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<InputReport>, SessionError> {
        let mut buf = BytesMut::zeroed(self.reply_buf_size);
        let len = self.transport.read_timeout(&mut buf[..], timeout).await?;
        if len == 0 {
            return Ok(None);
        }
        buf.truncate(len);
        Ok(Some(InputReport::new(buf.freeze())))
    }

    /// Sends `report` and waits for a reply accepted by `expect`, resending
    /// according to `policy`.
    ///
    /// Replies that do not match are skipped. Fails with
    /// [`SessionError::RetryBudgetExhausted`] once all attempts are used.
    #[tracing::instrument(target = "session", skip(self, report))]
    pub async fn send_and_wait(
        &mut self,
        report: &mut OutputReport,
        policy: RetryPolicy,
        expect: ReplyMatch,
    ) -> Result<InputReport, SessionError> {
        let reads_per_attempt = policy.reads_per_attempt.max(1);
        let mut attempts = 0;
        loop {
            if policy.attempts.map_or(false, |limit| attempts >= limit) {
                tracing::warn!("no matching reply after {} attempts, giving up.", attempts);
                return Err(SessionError::RetryBudgetExhausted { attempts });
            }
            attempts += 1;
            self.send(report).await?;
            for _ in 0..reads_per_attempt {
                let Some(reply) = self.next_input_report(policy.read_timeout).await? else {
                    tracing::debug!(attempts, "read timed out, resending.");
                    break;
                };
                match expect.check(&reply) {
                    Ok(()) => return Ok(reply),
                    Err(err) => tracing::trace!(attempts, "skipping reply: {}", err),
                }
            }
        }
    }

    #[tracing::instrument(target = "session", skip(self))]
    pub async fn device_info(&mut self) -> Result<DeviceInfo, SessionError> {
        let mut report = OutputReport::new();
        report.sub_0x02_request_device_info();
        let reply = self
            .send_and_wait(
                &mut report,
                RetryPolicy::bounded_query(),
                ReplyMatch::Ack(Subcommand::RequestDeviceInfo.reply_ack()),
            )
            .await?;
        let payload = reply.device_info_payload().map_err(short_read)?;
        let info = DeviceInfo::with_raw(&payload)?;
        tracing::info!(
            "device info: firmware {}, mac {}, kind {:?}.",
            info.firmware_version(),
            info.mac,
            info.kind
        );
        Ok(info)
    }

    /// Switches the controller's input report mode.
    ///
    /// The switch is not confirmed: a single reply is awaited briefly and
    /// discarded whatever it holds.
    #[tracing::instrument(target = "session", skip(self))]
    pub async fn set_input_report_mode(
        &mut self,
        mode: InputReportMode,
    ) -> Result<(), SessionError> {
        let mut report = OutputReport::new();
        report.sub_0x03_set_input_report_mode(mode);
        self.send(&mut report).await?;
        match self.next_input_report(MODE_SWITCH_READ_TIMEOUT).await? {
            Some(reply) => {
                if let Err(err) =
                    ReplyMatch::Ack(Subcommand::SetInputReportMode.reply_ack()).check(&reply)
                {
                    tracing::debug!("mode switch not acknowledged: {}", err);
                }
            }
            None => tracing::debug!("no reply to mode switch."),
        }
        Ok(())
    }
}
