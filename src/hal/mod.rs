pub mod power;
pub mod timer;

// Re-export commonly used types
pub use power::{DelayIdle, Idle};
pub use timer::{TickHook, TickTimer};

#[cfg(feature = "atmega128")]
pub use power::{Power, SleepMode};
#[cfg(feature = "atmega128")]
pub use timer::{Prescaler, SysTick};
