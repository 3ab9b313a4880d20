//! USB HID LED interface.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one HID reader/writer pair.

use defmt::info;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_usb::class::hid::{Config as HidConfig, HidReader, HidReaderWriter, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use hidled::transport::UsbHidTransport;
use hidled::{config, REPORT_DESCRIPTOR};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// OUT endpoint reader for LED commands.
pub type CommandReader = HidReader<'static, UsbDriver, { config::REPORT_CAPACITY }>;

/// IN endpoint writer for status acknowledgments.
pub type AckWriter = HidWriter<'static, UsbDriver, { config::STATUS_REPORT_LEN }>;

/// The command loop's transport on this board.
pub type BoardTransport = UsbHidTransport<
    'static,
    CommandReader,
    CriticalSectionRawMutex,
    { config::ACK_QUEUE_DEPTH },
>;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Build result containing the USB device runner and the HID endpoints.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub reader: CommandReader,
    pub writer: AckWriter,
}

/// Initialise the USB stack and create the HID interface.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = config::USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let hid_state = HID_STATE.init(State::new());
    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: config::REPORT_CAPACITY as u16,
    };
    let hid = HidReaderWriter::<_, { config::REPORT_CAPACITY }, { config::STATUS_REPORT_LEN }>::new(
        &mut builder,
        hid_state,
        hid_config,
    );
    let (reader, writer) = hid.split();

    let device = builder.build();

    info!(
        "USB HID LED interface initialised ({=u16:#x}:{=u16:#x})",
        config::USB_VID,
        config::USB_PID
    );

    UsbHidDevice {
        device,
        reader,
        writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}
