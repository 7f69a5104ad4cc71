//! Error status latch
//!
//! Holds the most recent scheduler error for a bounded number of
//! dispatcher passes, then clears itself. The dispatcher pushes the
//! displayed code to a status port whenever it changes.

use super::error::SchedulerError;
use crate::config::{ERROR_DISPLAY_TICKS, STATUS_CLEAR_PATTERN};

/// Sink for scheduler error reports
pub trait Report {
    /// Latch `error` as the current code
    fn record(&mut self, error: SchedulerError);

    /// Drop the current code without touching the display state
    fn clear(&mut self);

    /// One dispatcher pass. Returns the new port pattern when the
    /// displayed code changed.
    fn update(&mut self) -> Option<u8>;

    fn current(&self) -> Option<SchedulerError>;
}

/// Latch selected by the `report_errors` feature
#[cfg(feature = "report_errors")]
pub type DefaultLatch = StatusLatch;

#[cfg(not(feature = "report_errors"))]
pub type DefaultLatch = SilentLatch;

/// Port pattern for a code. LEDs are active low, so the code is inverted.
#[inline]
pub const fn display_pattern(code: Option<SchedulerError>) -> u8 {
    match code {
        Some(error) => !error.code(),
        None => STATUS_CLEAR_PATTERN,
    }
}

pub struct StatusLatch {
    code: Option<SchedulerError>,
    shown: Option<SchedulerError>,
    remaining: u32,
    window: u32,
}

impl StatusLatch {
    pub const fn new() -> Self {
        Self::with_window(ERROR_DISPLAY_TICKS)
    }

    /// Latch that holds each code for `window` passes (at least one)
    pub const fn with_window(window: u32) -> Self {
        Self {
            code: None,
            shown: None,
            remaining: 0,
            window: if window == 0 { 1 } else { window },
        }
    }

    /// Code currently on the status port
    #[inline]
    pub fn shown(&self) -> Option<SchedulerError> {
        self.shown
    }

    /// Passes left before the current code clears
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn window(&self) -> u32 {
        self.window
    }
}

impl Report for StatusLatch {
    fn record(&mut self, error: SchedulerError) {
        if self.code != Some(error) {
            self.code = Some(error);
            self.remaining = self.window;
        }
    }

    fn clear(&mut self) {
        self.code = None;
        self.remaining = 0;
    }

    fn update(&mut self) -> Option<u8> {
        if self.code != self.shown {
            self.shown = self.code;
            self.remaining = if self.code.is_some() { self.window } else { 0 };
            return Some(display_pattern(self.code));
        }

        if self.remaining != 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.code = None;
            }
        }
        None
    }

    #[inline]
    fn current(&self) -> Option<SchedulerError> {
        self.code
    }
}

impl Default for StatusLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Latch for builds without status reporting
#[derive(Default)]
pub struct SilentLatch;

impl SilentLatch {
    pub const fn new() -> Self {
        SilentLatch
    }
}

impl Report for SilentLatch {
    #[inline]
    fn record(&mut self, _error: SchedulerError) {}

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn update(&mut self) -> Option<u8> {
        None
    }

    #[inline]
    fn current(&self) -> Option<SchedulerError> {
        None
    }
}
