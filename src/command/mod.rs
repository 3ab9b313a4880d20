//! LED commands and the loop that applies them.

mod runner;


pub use runner::{CommandLoop, HidTransport};

use crate::config::{COMMAND_LEN, LED_COUNT};
use crate::error::Error;

/// Decoded LED command: one activation flag per LED, LED1 first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedCommand {
    levels: [bool; LED_COUNT],
}

impl LedCommand {
    pub const fn new(levels: [bool; LED_COUNT]) -> Self {
        Self { levels }
    }

    /// Decode a command from a report payload.
    ///
    /// Byte `i` turns LED `i + 1` on when non-zero. Bytes past the first
    /// four are ignored; fewer than four bytes is an error.
    pub fn parse(payload: &[u8]) -> Result<Self, Error> {
        let flags = payload
            .get(..COMMAND_LEN)
            .ok_or(Error::MalformedLength(payload.len()))?;

        let mut levels = [false; LED_COUNT];
        for (level, &flag) in levels.iter_mut().zip(flags) {
            *level = flag != 0;
        }
        Ok(Self { levels })
    }

    /// Host-side wire form: `1` for each active LED, `0` otherwise.
    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        self.levels.map(u8::from)
    }

    pub fn levels(&self) -> [bool; LED_COUNT] {
        self.levels
    }
}

/// What a single loop iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cycle {
    /// The transport returned no report.
    NoReport,
    /// A report arrived with no bytes in it.
    Empty,
    /// The command was applied and `Status::Success` was queued.
    Applied(LedCommand),
    /// The report was too short; `Status::Error` was queued.
    Rejected { length: usize },
}
