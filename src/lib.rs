//! Cooperative tick-driven task scheduler for small microcontrollers
//!
//! A timer interrupt advances a fixed table of periodic and one-shot
//! tasks; the main loop dispatches whatever came due, reports the error
//! status and sleeps until the next tick.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "atmega128", feature(abi_avr_interrupt))]

pub mod logging;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod os;
pub mod rtos;

pub use rtos::{Job, Scheduler, SchedulerError, TaskBuilder, TaskId, WithContext};
