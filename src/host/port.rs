use hidapi::{HidDevice, HidError};

/// An open HID device as seen by the IO thread.
pub trait HidPort: Send {
    /// Write one output report. The first byte is the report ID.
    fn write_report(&mut self, report: &[u8]) -> Result<usize, HidError>;

    /// Read one input report, waiting at most `timeout_ms`.
    /// Returns `Ok(0)` when nothing arrived in time.
    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, HidError>;
}

impl HidPort for HidDevice {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, HidError> {
        self.write(report)
    }

    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, HidError> {
        self.read_timeout(buf, timeout_ms)
    }
}
