//! ATmega128 demo firmware
//!
//! Heartbeat LEDs on PORTB driven by scheduled tasks, scheduler error
//! status on the PORTA LED bar, 1 ms tick from Timer0.

#![no_std]
#![no_main]

use panic_halt as _;

use avr_device::atmega128a::{Peripherals, PORTB};
use copos::config::DEFAULT_TICK_MS;
use copos::drivers::PortLeds;
use copos::hal::{Power, SysTick};
use copos::{os, TaskBuilder, WithContext};

/// One LED on PORTB
struct Led {
    mask: u8,
}

static LED0: Led = Led { mask: 1 << 0 };
static LED1: Led = Led { mask: 1 << 1 };

fn toggle(led: &'static Led, _ticks: u32) {
    // Safety: PORTB is only touched from main-loop tasks
    let portb = unsafe { &*PORTB::ptr() };
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() ^ led.mask) });
}

fn speed_up(_ticks: u32) {
    // Slot 0 is the slow heartbeat
    os::modify_task_period(0, 250).ok();
}

static HEARTBEAT: WithContext<Led> = WithContext::new(toggle, &LED0);
static ACTIVITY: WithContext<Led> = WithContext::new(toggle, &LED1);

#[avr_device::entry]
fn main() -> ! {
    let dp = Peripherals::take().unwrap();

    dp.PORTB.ddrb.write(|w| unsafe { w.bits(0x03) });

    let mut leds = PortLeds::new(dp.PORTA);
    let mut power = Power::new(dp.CPU);
    let mut timer = SysTick::new(dp.TC0);

    os::init();

    TaskBuilder::new(&HEARTBEAT).period(1000).spawn().ok();
    TaskBuilder::new(&ACTIVITY).delay(300).period(1000).spawn().ok();
    TaskBuilder::new(&speed_up).delay(10_000).spawn().ok();

    os::start(DEFAULT_TICK_MS, &mut timer);

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    loop {
        os::dispatch(SysTick::ticks(), &mut leds, &mut power);
    }
}
