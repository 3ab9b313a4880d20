//! Application-wide constants and compile-time configuration.
//!
//! USB identifiers, report sizes and queue depths live here so they can be
//! tuned in one place. The LED-to-command-byte mapping is fixed and is not
//! configurable.

// USB

/// USB VID/PID the host software looks for.
pub const USB_VID: u16 = 0x1234;
pub const USB_PID: u16 = 0x0006;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "hidled";
pub const USB_PRODUCT: &str = "USB HID LED Controller";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// Bus power requested from the host (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

// Reports

/// Capacity of an inbound or outbound report buffer, in bytes.
/// Matches the full-speed interrupt endpoint max packet size.
pub const REPORT_CAPACITY: usize = 64;

/// Number of leading bytes a command report must carry.
pub const COMMAND_LEN: usize = LED_COUNT;

/// Length of every acknowledgment report.
pub const STATUS_REPORT_LEN: usize = 1;

/// Acknowledgments waiting for the IN endpoint. When the queue is full the
/// newest acknowledgment is dropped.
pub const ACK_QUEUE_DEPTH: usize = 4;

// LEDs
//
// nRF52840-DK assignments (selected in `main.rs`):
//
//   LED1 → P0.13
//   LED2 → P0.14
//   LED3 → P0.15
//   LED4 → P0.16
//
// An active LED drives its pin high.

/// Number of LED outputs.
pub const LED_COUNT: usize = 4;
