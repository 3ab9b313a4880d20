//! Host-testable core of the hidled firmware.
//!
//! Everything here is hardware independent: report types, command
//! decoding, the LED bank, the command loop and its USB HID transport. The
//! embedded binary (`main.rs`, feature `embedded`) plugs in the nRF52840
//! GPIO and USB peripheral. The `host` feature adds the desktop client
//! used by `hidled-ctl`.
//!
//! Usage: `cargo test --lib`, `cargo test --lib --features host`

#![cfg_attr(not(any(test, feature = "host")), no_std)]

#[macro_use]
mod log;

pub mod command;
pub mod config;
pub mod error;
pub mod leds;
pub mod report;
pub mod transport;

#[cfg(feature = "host")]
pub mod host;

pub use command::{CommandLoop, Cycle, HidTransport, LedCommand};
pub use error::Error;
pub use leds::LedBank;
pub use report::{InboundReport, OutboundReport, Status, REPORT_DESCRIPTOR};
