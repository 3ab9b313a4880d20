//! The command loop: read a report, apply it, acknowledge it, repeat.

use embedded_hal::digital::OutputPin;

use super::{Cycle, LedCommand};
use crate::config::LED_COUNT;
use crate::leds::LedBank;
use crate::report::{InboundReport, OutboundReport, Status};

/// The USB HID channel as seen by the command loop.
#[allow(async_fn_in_trait)]
pub trait HidTransport {
    /// Wait for the next report from the host and store it in `report`.
    ///
    /// Returns `false` when no report was obtained. Transport errors are
    /// reported the same way.
    async fn read(&mut self, report: &mut InboundReport) -> bool;

    /// Queue `report` for transmission and return immediately.
    ///
    /// Delivery is never reported back. A report the transport cannot
    /// accept right now is dropped.
    fn send_nb(&mut self, report: &OutboundReport);
}

/// Owns the transport and the LEDs for the lifetime of the device.
pub struct CommandLoop<T, P> {
    transport: T,
    leds: LedBank<P>,
}

impl<T: HidTransport, P: OutputPin> CommandLoop<T, P> {
    /// Drive all LEDs inactive and take ownership of the transport.
    pub fn new(transport: T, pins: [P; LED_COUNT]) -> Self {
        let leds = LedBank::new(pins);
        info!("Command loop ready, LEDs {:?}", leds.states());
        Self { transport, leds }
    }

    /// Run forever.
    pub async fn run(mut self) -> ! {
        let mut report = InboundReport::new();
        loop {
            self.cycle(&mut report).await;
        }
    }

    /// One iteration: wait for a report, then [`handle`](Self::handle) it.
    pub async fn process_cycle(&mut self) -> Cycle {
        let mut report = InboundReport::new();
        self.cycle(&mut report).await
    }

    async fn cycle(&mut self, report: &mut InboundReport) -> Cycle {
        report.clear();
        if !self.transport.read(report).await {
            return Cycle::NoReport;
        }
        self.handle(report)
    }

    /// Apply a report that has already been read and acknowledge it.
    pub fn handle(&mut self, report: &InboundReport) -> Cycle {
        if report.is_empty() {
            return Cycle::Empty;
        }

        match LedCommand::parse(report.as_bytes()) {
            Ok(command) => {
                self.leds.apply(command.levels());
                debug!("LEDs {:?}", command.levels());
                self.acknowledge(Status::Success);
                Cycle::Applied(command)
            }
            Err(e) => {
                warn!("Rejected report: {:?}", e);
                self.acknowledge(Status::Error);
                Cycle::Rejected {
                    length: report.len(),
                }
            }
        }
    }

    fn acknowledge(&mut self, status: Status) {
        self.transport.send_nb(&OutboundReport::status(status));
    }

    /// Last commanded level of each LED, in order LED1..LED4.
    pub fn pin_states(&self) -> [bool; LED_COUNT] {
        self.leds.states()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}
