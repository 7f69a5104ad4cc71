pub mod status_leds;

pub use status_leds::{LedBar, NoDisplay, StatusDisplay};

#[cfg(feature = "atmega128")]
pub use status_leds::PortLeds;
