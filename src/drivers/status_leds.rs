//! Status display collaborator
//!
//! The latch hands over an already inverted error code (LEDs are wired
//! active low). Bit `i` of the pattern drives LED `i`.

use core::convert::Infallible;
use embedded_hal::digital::v2::OutputPin;

pub trait StatusDisplay {
    type Error;

    fn show(&mut self, pattern: u8) -> Result<(), Self::Error>;
}

/// Up to eight LEDs on individual output pins
pub struct LedBar<P, const W: usize> {
    pins: [P; W],
}

impl<P: OutputPin, const W: usize> LedBar<P, W> {
    pub fn new(pins: [P; W]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; W] {
        self.pins
    }
}

impl<P: OutputPin, const W: usize> StatusDisplay for LedBar<P, W> {
    type Error = P::Error;

    fn show(&mut self, pattern: u8) -> Result<(), Self::Error> {
        for (i, pin) in self.pins.iter_mut().enumerate().take(8) {
            if pattern & (1 << i) != 0 {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        Ok(())
    }
}

/// Display for builds without status output
#[derive(Default)]
pub struct NoDisplay;

impl StatusDisplay for NoDisplay {
    type Error = Infallible;

    #[inline]
    fn show(&mut self, _pattern: u8) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(feature = "atmega128")]
pub use self::avr::PortLeds;

#[cfg(feature = "atmega128")]
mod avr {
    use super::StatusDisplay;
    use avr_device::atmega128a::PORTA;
    use core::convert::Infallible;

    /// Eight LEDs on PORTA, written as one byte
    pub struct PortLeds {
        port: PORTA,
    }

    impl PortLeds {
        pub fn new(port: PORTA) -> Self {
            port.ddra.write(|w| unsafe { w.bits(0xFF) });
            port.porta.write(|w| unsafe { w.bits(0xFF) });
            Self { port }
        }
    }

    impl StatusDisplay for PortLeds {
        type Error = Infallible;

        fn show(&mut self, pattern: u8) -> Result<(), Self::Error> {
            self.port.porta.write(|w| unsafe { w.bits(pattern) });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

    #[test]
    fn drives_one_pin_per_bit() {
        let expect_low = [PinTransaction::set(PinState::Low)];
        let expect_high = [PinTransaction::set(PinState::High)];
        let pins = [
            PinMock::new(&expect_high),
            PinMock::new(&expect_low),
            PinMock::new(&expect_high),
            PinMock::new(&expect_high),
        ];

        let mut bar = LedBar::new(pins);
        // !2 = 0b1111_1101
        bar.show(!2u8).unwrap();

        for mut pin in bar.release() {
            pin.done();
        }
    }

    #[test]
    fn no_display_accepts_anything() {
        assert_eq!(NoDisplay.show(0x00), Ok(()));
    }
}
