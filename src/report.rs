//! HID reports exchanged with the host.
//!
//! Layout of a command (host → device), any length up to 64 bytes:
//! ```text
//! Byte 0: LED1 (0 = off, anything else = on)
//! Byte 1: LED2
//! Byte 2: LED3
//! Byte 3: LED4
//! Byte 4+: ignored
//! ```
//!
//! Layout of an acknowledgment (device → host), always 1 byte:
//! ```text
//! Byte 0: Status code (0 = accepted, 1 = rejected)
//! ```

use heapless::Vec;

use crate::config::{REPORT_CAPACITY, STATUS_REPORT_LEN};
use crate::error::Error;

/// Result of processing one non-empty inbound report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    /// Command accepted and applied to the LEDs.
    Success = 0,
    /// Command rejected because the report was too short.
    Error = 1,
}

impl Status {
    /// Wire value of this status.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Decode a status byte received from the device.
impl TryFrom<u8> for Status {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Status::Success),
            1 => Ok(Status::Error),
            other => Err(Error::UnknownStatus(other)),
        }
    }
}

/// A report received from the host.
///
/// Overwritten on every read; only the bytes of the last read are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundReport {
    data: Vec<u8, REPORT_CAPACITY>,
}

impl InboundReport {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Build a report from raw bytes, truncated to [`REPORT_CAPACITY`].
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut report = Self::new();
        report.fill(bytes);
        report
    }

    /// Replace the contents with `bytes`, truncated to [`REPORT_CAPACITY`].
    /// Returns the number of bytes stored.
    pub fn fill(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(REPORT_CAPACITY);
        self.data.clear();
        // Cannot fail: `n` never exceeds the capacity.
        let _ = self.data.extend_from_slice(&bytes[..n]);
        n
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A report sent to the host. Always carries a single status byte.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutboundReport {
    data: Vec<u8, STATUS_REPORT_LEN>,
}

impl OutboundReport {
    /// Acknowledgment carrying `status`.
    pub fn status(status: Status) -> Self {
        let mut data = Vec::new();
        // Cannot fail: one byte into a one-byte buffer.
        let _ = data.push(status.code());
        Self { data }
    }

    /// Decode the status byte.
    pub fn status_code(&self) -> Result<Status, Error> {
        match self.data.first() {
            Some(&code) => Status::try_from(code),
            None => Err(Error::MalformedLength(0)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes to put on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

// USB HID report descriptor for the vendor-defined LED interface

/// USB HID Report Descriptor for the LED controller.
///
/// This descriptor tells the USB host that we expose:
///   - one 64-byte output report (LED command)
///   - one 1-byte input report (status acknowledgment)
///
/// No report IDs are used, so byte 0 of a command is LED1.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01, // Usage (0x01)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    //
    //   - Status (1 byte, device → host) -
    0x09, 0x02, //   Usage (0x02)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Command (64 bytes, host → device) -
    0x09, 0x03, //   Usage (0x03)
    0x95, 0x40, //   Report Count (64)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
