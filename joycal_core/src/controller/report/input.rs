use super::ReportError;
use bytes::Bytes;

pub const INPUT_REPORT_MAX_LEN: usize = 0x170;

const ACK_OFFSET: usize = 0xD;
const DEVICE_INFO_OFFSET: usize = 0xF;
const DEVICE_INFO_LEN: usize = 0xA;
const SPI_ECHO_OFFSET: usize = 0xF;
const SPI_ECHO_SIZE_OFFSET: usize = 0x13;
const SPI_PAYLOAD_OFFSET: usize = 0x14;

// Button bytes of a standard input report.
// Ref: https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/bluetooth_hid_notes.md#standard-input-report---buttons
const RIGHT_BUTTONS_OFFSET: usize = 3;
const SHARED_BUTTONS_OFFSET: usize = 4;
const LEFT_BUTTONS_OFFSET: usize = 5;

// Processes incoming messages from the controller to the host.
#[derive(Clone, Debug)]
pub struct InputReport {
    buf: Bytes,
}

impl InputReport {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self { buf: buf.into() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The little-endian acknowledgment code at 0xD, if the reply reaches it.
    pub fn ack(&self) -> Option<u16> {
        let bytes = self.buf.get(ACK_OFFSET..ACK_OFFSET + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Offset and size echoed back by a SPI read reply.
    pub fn spi_read_echo(&self) -> Option<(u32, u8)> {
        let offset = self.buf.get(SPI_ECHO_OFFSET..SPI_ECHO_SIZE_OFFSET)?;
        let size = *self.buf.get(SPI_ECHO_SIZE_OFFSET)?;
        Some((
            u32::from_le_bytes([offset[0], offset[1], offset[2], offset[3]]),
            size,
        ))
    }

    pub fn spi_read_payload(&self, len: usize) -> Result<Bytes, ReportError> {
        self.slice(SPI_PAYLOAD_OFFSET, len)
    }

    pub fn device_info_payload(&self) -> Result<Bytes, ReportError> {
        self.slice(DEVICE_INFO_OFFSET, DEVICE_INFO_LEN)
    }

    pub fn right_buttons(&self) -> u8 {
        self.byte(RIGHT_BUTTONS_OFFSET)
    }

    pub fn shared_buttons(&self) -> u8 {
        self.byte(SHARED_BUTTONS_OFFSET)
    }

    pub fn left_buttons(&self) -> u8 {
        self.byte(LEFT_BUTTONS_OFFSET)
    }

    fn byte(&self, index: usize) -> u8 {
        self.buf.get(index).copied().unwrap_or(0)
    }

    fn slice(&self, offset: usize, len: usize) -> Result<Bytes, ReportError> {
        let end = offset + len;
        if self.buf.len() < end {
            return Err(ReportError::TooShort {
                expected: end,
                actual: self.buf.len(),
            });
        }
        Ok(self.buf.slice(offset..end))
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[..]
    }
}
