//! Unified error type for hidled.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! None of these ever stop the command loop; they end up as a status code
//! sent to the host or as a log line.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Protocol
    /// Inbound report is non-empty but shorter than a command.
    MalformedLength(usize),

    /// Byte received from the device is not a known status code.
    UnknownStatus(u8),

    // Transport
    /// An acknowledgment could not be queued or written to the endpoint.
    TransmissionFailed,

    // GPIO
    /// The pin driver rejected a level change.
    Pin,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedLength(len) => write!(f, "malformed report length {len}"),
            Error::UnknownStatus(code) => write!(f, "unknown status code {code}"),
            Error::TransmissionFailed => f.write_str("acknowledgment not transmitted"),
            Error::Pin => f.write_str("pin driver error"),
        }
    }
}

impl core::error::Error for Error {}
