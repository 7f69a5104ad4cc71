use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        // Host builds only run the scheduler core and its tests
        return;
    }

    // Configure for ATmega128
    println!("cargo:rustc-link-arg=-mmcu=atmega128");

    // Pass CPU frequency for timer prescaler calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    println!("cargo:warning=Building for ATmega128 at 16MHz");
}
