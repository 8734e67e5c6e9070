use super::{
    subcommand::{InputReportMode, Subcommand},
    ReportError,
};
use strum::Display;

pub const OUTPUT_REPORT_LEN: usize = 49;
pub const SPI_FLASH_SIZE: u32 = 0x80000;
// Largest payload a single SPI read/write subcommand can carry.
pub const SPI_TRANSFER_MAX_LEN: usize = 0x1D;

const TIMER_OFFSET: usize = 1;
const RUMBLE_RANGE: std::ops::Range<usize> = 2..10;
const SUBCOMMAND_OFFSET: usize = 10;
const SUBCOMMAND_DATA_OFFSET: usize = 11;
const SPI_SIZE_OFFSET: usize = 15;
const SPI_DATA_OFFSET: usize = 16;

// Ref: https://github.com/dekuNukem/Nintendo_Switch_Reverse_Engineering/blob/master/bluetooth_hid_notes.md#output-reports
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OutputReportId {
    SubCommand,
    RumbleOnly,
}

impl OutputReportId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::SubCommand),
            0x10 => Some(Self::RumbleOnly),
            _ => None,
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            Self::SubCommand => 0x01,
            Self::RumbleOnly => 0x10,
        }
    }
}

/// A command frame sent from the host to the controller.
///
/// Layout: report id, timer nibble, eight bytes of neutral rumble, subcommand
/// id, then subcommand arguments. The frame is always zero-padded to
/// [`OUTPUT_REPORT_LEN`] bytes.
#[derive(Clone, Debug)]
pub struct OutputReport {
    buf: [u8; OUTPUT_REPORT_LEN],
}

impl OutputReport {
    pub fn new() -> Self {
        let mut buf = [0x00; OUTPUT_REPORT_LEN];
        buf[0] = OutputReportId::SubCommand.to_byte();
        Self { buf }
    }

    pub fn with_raw(data: &[u8]) -> Result<Self, ReportError> {
        if data.len() <= SUBCOMMAND_OFFSET {
            return Err(ReportError::TooShort {
                expected: SUBCOMMAND_OFFSET + 1,
                actual: data.len(),
            });
        }
        if OutputReportId::from_byte(data[0]).is_none() {
            return Err(ReportError::Malformed);
        }
        let mut buf = [0x00; OUTPUT_REPORT_LEN];
        let len = data.len().min(OUTPUT_REPORT_LEN);
        buf[..len].copy_from_slice(&data[..len]);
        Ok(Self { buf })
    }

    pub fn output_report_id(&self) -> Option<OutputReportId> {
        OutputReportId::from_byte(self.buf[0])
    }

    pub fn set_output_report_id(&mut self, id: OutputReportId) {
        self.buf[0] = id.to_byte();
    }

    pub fn timer(&self) -> u8 {
        self.buf[TIMER_OFFSET]
    }

    pub fn set_timer(&mut self, timer: u8) {
        // Sets output report timer between [0x0, 0xF]
        self.buf[TIMER_OFFSET] = timer & 0xF;
    }

    pub fn rumble_data(&self) -> &[u8] {
        &self.buf[RUMBLE_RANGE]
    }

    pub fn subcommand(&self) -> Option<Subcommand> {
        Subcommand::from_byte(self.buf[SUBCOMMAND_OFFSET])
    }

    pub fn set_subcommand(&mut self, subcommand: Subcommand) {
        self.buf[SUBCOMMAND_OFFSET] = subcommand.to_byte();
    }

    pub fn subcommand_data(&self) -> &[u8] {
        &self.buf[SUBCOMMAND_DATA_OFFSET..]
    }

    pub fn set_subcommand_data(&mut self, data: &[u8]) -> Result<(), ReportError> {
        let end = SUBCOMMAND_DATA_OFFSET + data.len();
        let Some(slice) = self.buf.get_mut(SUBCOMMAND_DATA_OFFSET..end) else {
            return Err(ReportError::InvalidRange);
        };
        slice.copy_from_slice(data);
        Ok(())
    }

    // Offset argument of a SPI read/write frame.
    pub fn spi_offset(&self) -> u32 {
        let mut bytes = [0x00; 4];
        bytes.copy_from_slice(&self.buf[SUBCOMMAND_DATA_OFFSET..SPI_SIZE_OFFSET]);
        u32::from_le_bytes(bytes)
    }

    // Size argument of a SPI read/write frame.
    pub fn spi_size(&self) -> u8 {
        self.buf[SPI_SIZE_OFFSET]
    }

    // Payload of a SPI write frame, bounded by its size argument.
    pub fn spi_write_data(&self) -> &[u8] {
        let size = (self.spi_size() as usize).min(SPI_TRANSFER_MAX_LEN);
        &self.buf[SPI_DATA_OFFSET..SPI_DATA_OFFSET + size]
    }

    pub fn sub_0x02_request_device_info(&mut self) {
        self.set_output_report_id(OutputReportId::SubCommand);
        self.set_subcommand(Subcommand::RequestDeviceInfo);
    }

    pub fn sub_0x03_set_input_report_mode(&mut self, mode: InputReportMode) {
        self.set_output_report_id(OutputReportId::SubCommand);
        self.set_subcommand(Subcommand::SetInputReportMode);
        self.buf[SUBCOMMAND_DATA_OFFSET] = mode.to_byte();
    }

    pub fn sub_0x10_spi_flash_read(&mut self, offset: u32, size: usize) -> Result<(), ReportError> {
        check_spi_bounds(offset, size)?;
        // Creates output report data with spi flash read subcommand
        self.set_output_report_id(OutputReportId::SubCommand);
        self.set_subcommand(Subcommand::SpiFlashRead);
        self.set_spi_args(offset, size);
        Ok(())
    }

    pub fn sub_0x11_spi_flash_write(&mut self, offset: u32, data: &[u8]) -> Result<(), ReportError> {
        check_spi_bounds(offset, data.len())?;
        self.set_output_report_id(OutputReportId::SubCommand);
        self.set_subcommand(Subcommand::SpiFlashWrite);
        self.set_spi_args(offset, data.len());
        self.buf[SPI_DATA_OFFSET..SPI_DATA_OFFSET + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn set_spi_args(&mut self, offset: u32, size: usize) {
        self.buf[SUBCOMMAND_DATA_OFFSET..SPI_SIZE_OFFSET].copy_from_slice(&offset.to_le_bytes());
        self.buf[SPI_SIZE_OFFSET] = size as u8;
    }

    pub fn data(&self) -> &[u8] {
        &self.buf[..]
    }
}

impl Default for OutputReport {
    fn default() -> Self {
        Self::new()
    }
}

fn check_spi_bounds(offset: u32, size: usize) -> Result<(), ReportError> {
    if size > SPI_TRANSFER_MAX_LEN || offset as u64 + size as u64 > SPI_FLASH_SIZE as u64 {
        return Err(ReportError::OutOfBounds { offset, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{OutputReport, OutputReportId, OUTPUT_REPORT_LEN};
    use crate::controller::report::{
        subcommand::{InputReportMode, Subcommand},
        ReportError,
    };

    #[test]
    fn new_frame_is_zero_padded_subcommand_frame() {
        let report = OutputReport::new();
        assert_eq!(report.data().len(), OUTPUT_REPORT_LEN);
        assert_eq!(report.data()[0], 0x01);
        assert!(report.data()[1..].iter().all(|&b| b == 0));
        assert!(report.rumble_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn timer_keeps_low_nibble_only() {
        let mut report = OutputReport::new();
        report.set_timer(0x1F);
        assert_eq!(report.timer(), 0x0F);
    }

    #[test]
    fn spi_read_frame_layout() {
        let mut report = OutputReport::new();
        report.sub_0x10_spi_flash_read(0x603D, 9).unwrap();
        assert_eq!(report.subcommand(), Some(Subcommand::SpiFlashRead));
        assert_eq!(report.data()[10], 0x10);
        assert_eq!(&report.data()[11..16], &[0x3D, 0x60, 0x00, 0x00, 0x09]);
        assert_eq!(report.spi_offset(), 0x603D);
        assert_eq!(report.spi_size(), 9);
    }

    #[test]
    fn spi_write_frame_places_data_at_byte_16() {
        let mut report = OutputReport::new();
        let payload = [0xAA, 0xBB, 0xCC];
        report.sub_0x11_spi_flash_write(0x6089, &payload).unwrap();
        assert_eq!(report.data()[10], 0x11);
        assert_eq!(report.spi_offset(), 0x6089);
        assert_eq!(report.spi_size(), 3);
        assert_eq!(&report.data()[16..19], &payload);
        assert_eq!(report.spi_write_data(), &payload);
        assert!(report.data()[19..].iter().all(|&b| b == 0));
    }

    #[test]
    fn spi_transfers_are_bounded() {
        let mut report = OutputReport::new();
        assert!(matches!(
            report.sub_0x11_spi_flash_write(0x6000, &[0u8; 0x1E]),
            Err(ReportError::OutOfBounds { .. })
        ));
        assert!(matches!(
            report.sub_0x10_spi_flash_read(0x7FFFF, 2),
            Err(ReportError::OutOfBounds { .. })
        ));
        assert!(report.sub_0x11_spi_flash_write(0x6000, &[0u8; 0x1D]).is_ok());
    }

    #[test]
    fn input_report_mode_argument() {
        let mut report = OutputReport::new();
        report.sub_0x03_set_input_report_mode(InputReportMode::Standard);
        assert_eq!(report.subcommand(), Some(Subcommand::SetInputReportMode));
        assert_eq!(report.subcommand_data()[0], 0x30);
    }

    #[test]
    fn raw_frames_are_validated() {
        assert!(matches!(
            OutputReport::with_raw(&[0x01, 0x00]),
            Err(ReportError::TooShort { .. })
        ));
        assert!(matches!(
            OutputReport::with_raw(&[0xA2; 20]),
            Err(ReportError::Malformed)
        ));
        let mut report = OutputReport::new();
        report.sub_0x02_request_device_info();
        let parsed = OutputReport::with_raw(report.data()).unwrap();
        assert_eq!(parsed.output_report_id(), Some(OutputReportId::SubCommand));
        assert_eq!(parsed.subcommand(), Some(Subcommand::RequestDeviceInfo));
    }
}
