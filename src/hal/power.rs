//! Idle collaborator: park the CPU until the next tick

use core::convert::Infallible;
use embedded_hal::blocking::delay::DelayMs;

/// Wait for the next interrupt.
///
/// Returns `WouldBlock` while the wait is still in progress; the
/// dispatcher drives it with `nb::block!`.
pub trait Idle {
    fn wait_for_interrupt(&mut self) -> nb::Result<(), Infallible>;
}

/// Idles by delaying one tick period on any blocking delay provider.
/// For targets without a usable sleep instruction.
pub struct DelayIdle<D> {
    delay: D,
    tick_ms: u32,
}

impl<D: DelayMs<u32>> DelayIdle<D> {
    pub fn new(delay: D, tick_ms: u32) -> Self {
        Self { delay, tick_ms }
    }

    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayMs<u32>> Idle for DelayIdle<D> {
    fn wait_for_interrupt(&mut self) -> nb::Result<(), Infallible> {
        self.delay.delay_ms(self.tick_ms);
        Ok(())
    }
}

#[cfg(feature = "atmega128")]
pub use self::avr::{Power, SleepMode};

#[cfg(feature = "atmega128")]
mod avr {
    use super::Idle;
    use avr_device::atmega128a::CPU;
    use core::convert::Infallible;

    // MCUCR sleep enable
    const SE: u8 = 1 << 5;
    // MCUCR: SM1 bit 4, SM0 bit 3, SM2 bit 2
    const SM_MASK: u8 = 0x1C;

    #[derive(Clone, Copy)]
    #[repr(u8)]
    pub enum SleepMode {
        Idle = 0,
        AdcNoiseReduction = 1,
        PowerDown = 2,
        PowerSave = 3,
        Standby = 6,
        ExtendedStandby = 7,
    }

    pub struct Power {
        cpu: CPU,
    }

    impl Power {
        pub fn new(cpu: CPU) -> Self {
            Self { cpu }
        }

        #[inline]
        pub fn set_sleep_mode(&mut self, mode: SleepMode) {
            let mode = mode as u8;
            let bits = ((mode & 0b011) << 3) | (mode & 0b100);
            self.cpu
                .mcucr
                .modify(|r, w| unsafe { w.bits((r.bits() & !SM_MASK) | bits) });
        }

        #[inline]
        fn enable_sleep(&mut self) {
            self.cpu.mcucr.modify(|r, w| unsafe { w.bits(r.bits() | SE) });
        }

        #[inline]
        fn disable_sleep(&mut self) {
            self.cpu.mcucr.modify(|r, w| unsafe { w.bits(r.bits() & !SE) });
        }

        /// Sleep in idle mode; timers keep running and wake the CPU
        pub fn enter_idle_mode(&mut self) {
            self.set_sleep_mode(SleepMode::Idle);
            self.enable_sleep();
            avr_device::asm::sleep();
            self.disable_sleep();
        }
    }

    impl Idle for Power {
        fn wait_for_interrupt(&mut self) -> nb::Result<(), Infallible> {
            self.enter_idle_mode();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::delay::MockNoop;

    #[test]
    fn delay_idle_completes_in_one_poll() {
        let mut idle = DelayIdle::new(MockNoop::new(), 1);
        assert_eq!(nb::block!(idle.wait_for_interrupt()), Ok(()));
        let _delay: MockNoop = idle.release();
    }
}
