//! Tick timer collaborator
//!
//! The scheduler only needs two things from a timer: a tick period and a
//! hook called once per tick from interrupt context.

/// Called from the timer interrupt with the running tick count
pub type TickHook = fn(u32);

pub trait TickTimer {
    fn set_tick_period(&mut self, ms: u32);
    fn set_tick_hook(&mut self, hook: TickHook);
}

#[cfg(feature = "atmega128")]
pub use self::avr::{Prescaler, SysTick};

#[cfg(feature = "atmega128")]
mod avr {
    use super::{TickHook, TickTimer};
    use crate::config::CPU_FREQ_HZ;
    use avr_device::atmega128a::TC0;
    use avr_device::interrupt::{self, Mutex};
    use core::cell::Cell;

    // CTC mode, WGM01
    const TCCR0_CTC: u8 = 1 << 3;
    // Output compare match interrupt enable, OCIE0
    const TIMSK_OCIE0: u8 = 1 << 1;

    static HOOK: Mutex<Cell<Option<TickHook>>> = Mutex::new(Cell::new(None));
    static PERIOD_MS: Mutex<Cell<u32>> = Mutex::new(Cell::new(1));
    static ELAPSED_MS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));
    static TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

    /// Timer0 clock select values (Timer0 has its own prescaler table)
    #[derive(Clone, Copy)]
    #[repr(u8)]
    pub enum Prescaler {
        Stop = 0,
        Direct = 1,
        Div8 = 2,
        Div32 = 3,
        Div64 = 4,
        Div128 = 5,
        Div256 = 6,
        Div1024 = 7,
    }

    /// 1 ms compare-match interrupt on Timer0, divided down to the tick period
    pub struct SysTick {
        tc0: TC0,
    }

    impl SysTick {
        pub fn new(tc0: TC0) -> Self {
            tc0.tccr0.write(|w| unsafe { w.bits(0) });
            tc0.tcnt0.write(|w| unsafe { w.bits(0) });
            Self { tc0 }
        }

        fn start(&mut self, prescaler: Prescaler) {
            // 16MHz/64 = 250kHz, 250 counts = 1ms
            let top = (CPU_FREQ_HZ / 64 / 1000 - 1) as u8;
            self.tc0.ocr0.write(|w| unsafe { w.bits(top) });
            self.tc0
                .tccr0
                .write(|w| unsafe { w.bits(TCCR0_CTC | prescaler as u8) });
            self.tc0
                .timsk
                .modify(|r, w| unsafe { w.bits(r.bits() | TIMSK_OCIE0) });
        }

        pub fn stop(&mut self) {
            self.tc0
                .timsk
                .modify(|r, w| unsafe { w.bits(r.bits() & !TIMSK_OCIE0) });
            self.tc0.tccr0.write(|w| unsafe { w.bits(Prescaler::Stop as u8) });
        }

        /// Ticks elapsed since the hook was installed
        pub fn ticks() -> u32 {
            interrupt::free(|cs| TICKS.borrow(cs).get())
        }
    }

    impl TickTimer for SysTick {
        fn set_tick_period(&mut self, ms: u32) {
            interrupt::free(|cs| {
                PERIOD_MS.borrow(cs).set(ms.max(1));
                ELAPSED_MS.borrow(cs).set(0);
            });
            self.start(Prescaler::Div64);
        }

        fn set_tick_hook(&mut self, hook: TickHook) {
            interrupt::free(|cs| {
                TICKS.borrow(cs).set(0);
                HOOK.borrow(cs).set(Some(hook));
            });
        }
    }

    #[avr_device::interrupt(atmega128a)]
    fn TIMER0_COMP() {
        interrupt::free(|cs| {
            let elapsed = ELAPSED_MS.borrow(cs).get() + 1;
            if elapsed < PERIOD_MS.borrow(cs).get() {
                ELAPSED_MS.borrow(cs).set(elapsed);
                return;
            }
            ELAPSED_MS.borrow(cs).set(0);

            let ticks = TICKS.borrow(cs).get().wrapping_add(1);
            TICKS.borrow(cs).set(ticks);
            if let Some(hook) = HOOK.borrow(cs).get() {
                hook(ticks);
            }
        });
    }
}
