//! hidled firmware entry point (nRF52840).
//!
//! Brings up the four LED outputs (inactive), the USB HID interface and
//! the acknowledgment writer, then hands the main task over to the
//! command loop, which never returns.

#![no_std]
#![no_main]

mod usb;

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::config::{Config as NrfConfig, HfclkSource};
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::UsbDevice;
use hidled::transport;
use hidled::{config, CommandLoop, OutboundReport};
use usb::hid_device::{self, AckWriter, BoardTransport, UsbDriver};
use {defmt_rtt as _, embassy_time as _, panic_probe as _};

/// Acknowledgments queued by the command loop for the IN endpoint.
static ACK_CHANNEL: Channel<CriticalSectionRawMutex, OutboundReport, { config::ACK_QUEUE_DEPTH }> =
    Channel::new();

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn ack_writer_task(writer: AckWriter) -> ! {
    transport::ack_writer(writer, ACK_CHANNEL.receiver()).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // The USB peripheral needs the external 32 MHz crystal.
    let mut nrf_config = NrfConfig::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    info!("hidled v{} starting", env!("CARGO_PKG_VERSION"));

    // LEDs are inactive before USB enumerates.
    let leds = [
        Output::new(p.P0_13, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_14, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_15, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_16, Level::Low, OutputDrive::Standard),
    ];

    let usb = hid_device::init(p.USBD);
    unwrap!(spawner.spawn(usb_task(usb.device)));
    unwrap!(spawner.spawn(ack_writer_task(usb.writer)));

    let transport = BoardTransport::new(usb.reader, ACK_CHANNEL.sender());
    CommandLoop::new(transport, leds).run().await
}
