//! The four LED outputs and their logical state.
//!
//! The bank is the only writer of the pins. Its logical state records the
//! last commanded level even if a pin driver reports an error.

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::LED_COUNT;
use crate::error::Error;

pub struct LedBank<P> {
    pins: [P; LED_COUNT],
    states: [bool; LED_COUNT],
}

impl<P: OutputPin> LedBank<P> {
    /// Take ownership of the pins and drive them all inactive.
    pub fn new(pins: [P; LED_COUNT]) -> Self {
        let mut bank = Self {
            pins,
            states: [false; LED_COUNT],
        };
        bank.apply([false; LED_COUNT]);
        bank
    }

    /// Drive every pin to the matching level in `levels` (`true` = active).
    pub fn apply(&mut self, levels: [bool; LED_COUNT]) {
        for (i, (pin, &active)) in self.pins.iter_mut().zip(levels.iter()).enumerate() {
            if pin.set_state(PinState::from(active)).is_err() {
                warn!("LED{}: {:?}", i + 1, Error::Pin);
            }
        }
        self.states = levels;
    }

    /// Last commanded level of each LED, in order LED1..LED4.
    pub fn states(&self) -> [bool; LED_COUNT] {
        self.states
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use core::cell::Cell;
    use core::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

    /// Test pin that records its level and how many times it was written.
    #[derive(Clone, Default)]
    pub struct Pin {
        high: Rc<Cell<bool>>,
        writes: Rc<Cell<usize>>,
    }

    impl Pin {
        /// A pin that starts high, to prove the bank pulls it low.
        pub fn high() -> Self {
            let pin = Self::default();
            pin.high.set(true);
            pin
        }

        pub fn is_high(&self) -> bool {
            self.high.get()
        }

        pub fn writes(&self) -> usize {
            self.writes.get()
        }
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high.set(false);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high.set(true);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    /// Test pin whose driver always fails.
    #[derive(Default)]
    pub struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    pub fn pins() -> ([Pin; 4], [Pin; 4]) {
        let pins = [Pin::high(), Pin::high(), Pin::high(), Pin::high()];
        (pins.clone(), pins)
    }

    pub fn levels(pins: &[Pin; 4]) -> [bool; 4] {
        [
            pins[0].is_high(),
            pins[1].is_high(),
            pins[2].is_high(),
            pins[3].is_high(),
        ]
    }
}
