use super::{report::ReportError, ControllerKind};
use macaddr::MacAddr6;

/// Decoded reply to the device info subcommand (0x02).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeviceInfo {
    pub firmware_major: u8,
    pub firmware_minor: u8,
    // `None` when the controller reports a type this tool does not know.
    pub kind: Option<ControllerKind>,
    pub mac: MacAddr6,
}

impl DeviceInfo {
    pub fn with_raw(payload: &[u8]) -> Result<Self, ReportError> {
        if payload.len() < 10 {
            return Err(ReportError::TooShort {
                expected: 10,
                actual: payload.len(),
            });
        }
        Ok(Self {
            firmware_major: payload[0],
            firmware_minor: payload[1],
            kind: ControllerKind::from_id(payload[2]),
            mac: MacAddr6::new(
                payload[4], payload[5], payload[6], payload[7], payload[8], payload[9],
            ),
        })
    }

    // Firmware version formatted as `major.minor`, e.g. `4.21`.
    pub fn firmware_version(&self) -> String {
        format!("{:X}.{:02X}", self.firmware_major, self.firmware_minor)
    }
}
