//! Configuration constants for the scheduler and the ATmega128 board

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Number of task slots in the global task table
pub const MAX_TASKS: usize = 16;

/// Scheduler tick period in milliseconds
pub const DEFAULT_TICK_MS: u32 = 1;

/// How many dispatcher passes an error code stays on the status port.
/// 60000 passes is about one minute at a 1 ms tick.
pub const ERROR_DISPLAY_TICKS: u32 = 60_000;

/// Status port pattern when no error is active (negative logic LEDs)
pub const STATUS_CLEAR_PATTERN: u8 = 0xFF;
