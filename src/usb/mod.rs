//! USB Device subsystem - presents the LED controller to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. The device exposes a single vendor-defined HID
//! interface:
//!
//! - Interrupt OUT: LED commands from the host
//! - Interrupt IN:  one-byte status acknowledgments
//!
//! The command loop reads through `hidled::transport::UsbHidTransport`;
//! its acknowledgments are queued on a channel and written to the IN
//! endpoint by `hidled::transport::ack_writer`.

pub mod hid_device;
