use crate::transport::HidTransport;
use async_trait::async_trait;
use joycal_core::controller::{
    flash::SERIAL_NUMBER_ADDR,
    report::{
        output::{OutputReport, OUTPUT_REPORT_LEN, SPI_FLASH_SIZE},
        subcommand::{InputReportMode, Subcommand},
    },
    stick::encode_triplet,
    ControllerKind,
};
use std::{collections::VecDeque, sync::Mutex, time::Duration};
use tokio::time;

pub(crate) const SIMULATED_MAC: [u8; 6] = [0x98, 0xB6, 0xE9, 0x0A, 0x1B, 0x2C];
pub(crate) const SIMULATED_SERIAL: &str = "XAW70012345678";

const SUBCOMMAND_REPLY_ID: u8 = 0x21;
const STANDARD_REPORT_ID: u8 = 0x30;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// A subcommand reply carrying `data` right after the acknowledgment code.
pub(crate) fn subcommand_reply(subcommand: Subcommand, data: &[u8]) -> Vec<u8> {
    let mut buf = vec![0x00; OUTPUT_REPORT_LEN.max(0xF + data.len())];
    buf[0] = SUBCOMMAND_REPLY_ID;
    buf[0xD..0xF].copy_from_slice(&subcommand.reply_ack().to_le_bytes());
    buf[0xF..0xF + data.len()].copy_from_slice(data);
    buf
}

pub(crate) fn spi_read_reply(offset: u32, data: &[u8]) -> Vec<u8> {
    let mut body = offset.to_le_bytes().to_vec();
    body.push(data.len() as u8);
    body.extend_from_slice(data);
    subcommand_reply(Subcommand::SpiFlashRead, &body)
}

pub(crate) fn standard_report(
    left: (u16, u16),
    right: (u16, u16),
    right_buttons: u8,
    left_buttons: u8,
) -> Vec<u8> {
    let mut buf = vec![0x00; OUTPUT_REPORT_LEN];
    buf[0] = STANDARD_REPORT_ID;
    buf[3] = right_buttons;
    buf[5] = left_buttons;
    buf[6..9].copy_from_slice(&encode_triplet(left.0, left.1));
    buf[9..12].copy_from_slice(&encode_triplet(right.0, right.1));
    buf
}

/// Plays back canned replies in order. An empty reply, or running out of
/// replies, reads as a timeout.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Vec<u8>>>,
    writes: Mutex<Vec<Vec<u8>>>,
    // Bytes accepted per write, everything when `None`.
    write_limit: Option<usize>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            writes: Mutex::new(Vec::new()),
            write_limit: None,
        }
    }

    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl HidTransport for ScriptedTransport {
    async fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
        self.writes.lock().unwrap().push(buf.to_vec());
        Ok(self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len())))
    }

    async fn read_timeout(&self, buf: &mut [u8], timeout: Duration) -> std::io::Result<usize> {
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        if reply.is_empty() {
            time::sleep(timeout).await;
            return Ok(0);
        }
        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        Ok(len)
    }
}

#[derive(Debug)]
struct SimulatedState {
    kind: ControllerKind,
    flash: Vec<u8>,
    mode: Option<InputReportMode>,
    pending: VecDeque<Vec<u8>>,
    input_reports: VecDeque<Vec<u8>>,
    requests: Vec<OutputReport>,
    flash_writes: Vec<(u32, Vec<u8>)>,
    // Flash writes to acknowledge before replies start getting dropped.
    acked_writes_before_drop: u32,
    dropped_write_replies: u32,
}

/// A controller with a flash image that answers subcommands the way the
/// firmware does.
#[derive(Debug)]
pub(crate) struct SimulatedController {
    state: Mutex<SimulatedState>,
}

impl SimulatedController {
    pub fn new(kind: ControllerKind) -> Self {
        let mut flash = vec![0xFF; SPI_FLASH_SIZE as usize];
        let serial = SERIAL_NUMBER_ADDR as usize;
        flash[serial..serial + 0x10].fill(0x00);
        flash[serial..serial + SIMULATED_SERIAL.len()].copy_from_slice(SIMULATED_SERIAL.as_bytes());
        // Factory stick calibration.
        flash[0x603D..0x6046]
            .copy_from_slice(&[0x00, 0x07, 0x70, 0x00, 0x08, 0x80, 0x00, 0x07, 0x70]);
        flash[0x6046..0x604F]
            .copy_from_slice(&[0x00, 0x08, 0x80, 0x00, 0x07, 0x70, 0x00, 0x07, 0x70]);
        Self {
            state: Mutex::new(SimulatedState {
                kind,
                flash,
                mode: None,
                pending: VecDeque::new(),
                input_reports: VecDeque::new(),
                requests: Vec::new(),
                flash_writes: Vec::new(),
                acked_writes_before_drop: 0,
                dropped_write_replies: 0,
            }),
        }
    }

    // Acknowledges `acked` flash writes, then drops the replies of the next
    // `dropped` ones.
    pub fn drop_write_replies_after(&self, acked: u32, dropped: u32) {
        let mut state = self.state.lock().unwrap();
        state.acked_writes_before_drop = acked;
        state.dropped_write_replies = dropped;
    }

    // Reports streamed once the standard input report mode is on.
    pub fn push_input_reports(&self, reports: impl IntoIterator<Item = Vec<u8>>) {
        self.state.lock().unwrap().input_reports.extend(reports);
    }

    pub fn flash(&self, offset: u32, len: usize) -> Vec<u8> {
        let offset = offset as usize;
        self.state.lock().unwrap().flash[offset..offset + len].to_vec()
    }

    pub fn flash_writes(&self) -> Vec<(u32, Vec<u8>)> {
        self.state.lock().unwrap().flash_writes.clone()
    }

    pub fn requests(&self) -> Vec<OutputReport> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn timers(&self) -> Vec<u8> {
        self.requests().iter().map(|r| r.timer()).collect()
    }

    pub fn mode(&self) -> Option<InputReportMode> {
        self.state.lock().unwrap().mode
    }
}

impl SimulatedState {
    fn handle(&mut self, report: OutputReport) {
        let reply = match report.subcommand() {
            Some(Subcommand::RequestDeviceInfo) => {
                let mut info = vec![0x04, 0x21, self.kind.id(), 0x02];
                info.extend_from_slice(&SIMULATED_MAC);
                Some(subcommand_reply(Subcommand::RequestDeviceInfo, &info))
            }
            Some(Subcommand::SetInputReportMode) => {
                self.mode = InputReportMode::from_byte(report.subcommand_data()[0]);
                Some(subcommand_reply(Subcommand::SetInputReportMode, &[]))
            }
            Some(Subcommand::SpiFlashRead) => {
                let offset = report.spi_offset();
                let start = offset as usize;
                let data = &self.flash[start..start + report.spi_size() as usize];
                Some(spi_read_reply(offset, data))
            }
            Some(Subcommand::SpiFlashWrite) => {
                let offset = report.spi_offset();
                let data = report.spi_write_data().to_vec();
                let start = offset as usize;
                self.flash[start..start + data.len()].copy_from_slice(&data);
                self.flash_writes.push((offset, data));
                if self.acked_writes_before_drop > 0 {
                    self.acked_writes_before_drop -= 1;
                    Some(subcommand_reply(Subcommand::SpiFlashWrite, &[0x00]))
                } else if self.dropped_write_replies > 0 {
                    self.dropped_write_replies -= 1;
                    None
                } else {
                    Some(subcommand_reply(Subcommand::SpiFlashWrite, &[0x00]))
                }
            }
            None => None,
        };
        self.requests.push(report);
        self.pending.extend(reply);
    }

    fn next_reply(&mut self) -> Option<Vec<u8>> {
        if let Some(reply) = self.pending.pop_front() {
            return Some(reply);
        }
        match self.mode {
            Some(InputReportMode::Standard) => self.input_reports.pop_front(),
            _ => None,
        }
    }
}

#[async_trait]
impl HidTransport for SimulatedController {
    async fn write(&self, buf: &[u8]) -> std::io::Result<usize> {
        let report = OutputReport::with_raw(buf)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
        self.state.lock().unwrap().handle(report);
        Ok(buf.len())
    }

    async fn read_timeout(&self, buf: &mut [u8], timeout: Duration) -> std::io::Result<usize> {
        let reply = self.state.lock().unwrap().next_reply();
        let Some(reply) = reply else {
            time::sleep(timeout).await;
            return Ok(0);
        };
        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        Ok(len)
    }
}
