//! Host-side client for the LED controller (feature `host`).
//!
//! Opens the device by VID/PID through `hidapi`, queues LED commands for a
//! single IO thread and hands every status byte the device sends back to a
//! [`Listener`].
//!
//! On the wire a command is an output report without a report ID, so
//! hidapi needs a leading `0` before the four LED bytes:
//! ```text
//! [0x00, LED1, LED2, LED3, LED4]
//! ```

mod client;
mod port;

use std::time::Duration;

use thiserror::Error;

pub use client::LedClient;
pub use port::HidPort;

use crate::command::LedCommand;
use crate::config::{COMMAND_LEN, USB_PID, USB_VID};
use crate::report::Status;

/// hidapi report ID for devices that do not use numbered reports.
const NO_REPORT_ID: u8 = 0;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("protocol error: {0}")]
    Protocol(#[from] crate::Error),

    #[error("failed to start IO thread: {0}")]
    Thread(#[from] std::io::Error),

    #[error("command queue is full")]
    QueueFull,

    #[error("client is closed")]
    Closed,
}

pub type HostResult<T> = Result<T, HostError>;

/// Receives what the IO thread reads from the device.
///
/// Called on the IO thread, so implementations should return quickly.
pub trait Listener: Send + 'static {
    fn on_status(&mut self, status: Status);

    /// A read, write or decode failed. The IO thread keeps running.
    fn on_error(&mut self, error: HostError);
}

/// Forwards everything to a channel, for callers that want to wait on a
/// status from their own thread.
impl Listener for crossbeam::channel::Sender<HostResult<Status>> {
    fn on_status(&mut self, status: Status) {
        let _ = self.send(Ok(status));
    }

    fn on_error(&mut self, error: HostError) {
        let _ = self.send(Err(error));
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// How long one read waits for a status before the IO thread moves on
    /// to pending writes.
    pub read_timeout: Duration,
    /// Extra attempts for a failed write. `0` means no retries.
    pub write_retries: u32,
    /// Commands that may wait for the IO thread before
    /// [`LedClient::write_async`] reports [`HostError::QueueFull`].
    pub queue_depth: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            vendor_id: USB_VID,
            product_id: USB_PID,
            read_timeout: Duration::from_millis(5),
            write_retries: 0,
            queue_depth: 64,
        }
    }
}

/// Output report for `command`, prefixed with the report ID hidapi expects.
pub fn output_report(command: &LedCommand) -> [u8; COMMAND_LEN + 1] {
    let mut report = [NO_REPORT_ID; COMMAND_LEN + 1];
    report[1..].copy_from_slice(&command.encode());
    report
}

/// Decode an input report read from the device.
///
/// Only the first byte carries the status; anything after it is padding.
pub fn decode_status(report: &[u8]) -> Result<Status, crate::Error> {
    match report.first() {
        Some(&code) => Status::try_from(code),
        None => Err(crate::Error::MalformedLength(0)),
    }
}
