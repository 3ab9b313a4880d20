//! [`HidTransport`] over the Embassy USB HID endpoints.
//!
//! Reads block on the interrupt OUT endpoint. Acknowledgments are pushed
//! into a bounded channel without waiting; [`ack_writer`] drains that
//! channel into the interrupt IN endpoint in submission order. When the
//! channel is full the newest acknowledgment is dropped.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_usb::class::hid::{HidReader, HidWriter, ReadError};
use embassy_usb::driver::{Driver, EndpointError};

use crate::command::HidTransport;
use crate::config::REPORT_CAPACITY;
use crate::error::Error;
use crate::report::{InboundReport, OutboundReport};

/// Source of host → device reports.
#[allow(async_fn_in_trait)]
pub trait ReportReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError>;

    /// Wait until the endpoint is enabled by the host.
    async fn ready(&mut self);
}

/// Sink for device → host reports.
#[allow(async_fn_in_trait)]
pub trait ReportWriter {
    async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError>;
}

impl<'d, D: Driver<'d>, const N: usize> ReportReader for HidReader<'d, D, N> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
        HidReader::read(self, buf).await
    }

    async fn ready(&mut self) {
        HidReader::ready(self).await
    }
}

impl<'d, D: Driver<'d>, const N: usize> ReportWriter for HidWriter<'d, D, N> {
    async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        HidWriter::write(self, report).await
    }
}

pub struct UsbHidTransport<'a, R, M: RawMutex, const Q: usize> {
    reader: R,
    acks: Sender<'a, M, OutboundReport, Q>,
    buf: [u8; REPORT_CAPACITY],
}

impl<'a, R: ReportReader, M: RawMutex, const Q: usize> UsbHidTransport<'a, R, M, Q> {
    pub fn new(reader: R, acks: Sender<'a, M, OutboundReport, Q>) -> Self {
        Self {
            reader,
            acks,
            buf: [0; REPORT_CAPACITY],
        }
    }
}

impl<R: ReportReader, M: RawMutex, const Q: usize> HidTransport for UsbHidTransport<'_, R, M, Q> {
    async fn read(&mut self, report: &mut InboundReport) -> bool {
        match self.reader.read(&mut self.buf).await {
            Ok(n) => {
                report.fill(&self.buf[..n]);
                true
            }
            Err(ReadError::Disabled) => {
                debug!("HID OUT endpoint disabled, waiting for host");
                self.reader.ready().await;
                false
            }
            Err(ReadError::BufferOverflow) => {
                warn!("Host sent a report larger than {} bytes", REPORT_CAPACITY);
                false
            }
            Err(ReadError::Sync(_)) => {
                warn!("HID OUT read resynchronised, report discarded");
                false
            }
        }
    }

    fn send_nb(&mut self, report: &OutboundReport) {
        if self.acks.try_send(report.clone()).is_err() {
            warn!("Acknowledgment dropped: {:?}", Error::TransmissionFailed);
        }
    }
}

/// Move the oldest queued acknowledgment to `writer`.
pub async fn forward_ack<W: ReportWriter, M: RawMutex, const Q: usize>(
    writer: &mut W,
    acks: &Receiver<'_, M, OutboundReport, Q>,
) -> Result<(), EndpointError> {
    let report = acks.receive().await;
    writer.write(report.as_bytes()).await
}

/// Acknowledgment forwarding task body. A failed write loses that
/// acknowledgment only.
pub async fn ack_writer<W: ReportWriter, M: RawMutex, const Q: usize>(
    mut writer: W,
    acks: Receiver<'_, M, OutboundReport, Q>,
) -> ! {
    info!("Acknowledgment writer started");

    loop {
        if let Err(e) = forward_ack(&mut writer, &acks).await {
            warn!("USB status write failed: {:?}", e);
        }
    }
}
