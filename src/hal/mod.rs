//! Hardware Abstraction Layer for the AFSK front-end.
//!
//! The front-end only ever talks to one timer, one converter and one output
//! port. `SampleHal` is that surface and nothing more; the tick logic in
//! `dispatcher` is written against it so it runs unchanged on the simulated
//! backend and on the device.
//!
//! Configuration calls are absolute: calling one twice with the same
//! arguments leaves the peripheral exactly as one call would.

pub mod sim;

#[cfg(target_os = "espidf")]
pub mod esp;

#[cfg(all(target_os = "espidf", not(feature = "esp32s3")))]
compile_error!("the ESP-IDF backend only has an ESP32-S3 pin map; enable feature `esp32s3`");

pub use sim::{SimFrontEnd, SimRegisters};

use crate::capture::AdcChannel;

/// Raw error code reported by a peripheral driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalError(i32);

impl HalError {
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Platform error code (`esp_err_t` on the device).
    pub const fn code(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "peripheral error 0x{:x}", self.0)
    }
}

/// Peripheral operations used by the front-end.
pub trait SampleHal {
    /// Run the counter from the base clock, no prescaler, overflowing every
    /// `reload + 1` cycles.
    fn configure_clock(&mut self, reload: u16) -> Result<(), HalError>;

    /// Supply reference, multiplexer on `channel`, pin input-only with its
    /// digital buffer off, conversions auto-triggered by the clock overflow.
    fn configure_converter(&mut self, channel: AdcChannel) -> Result<(), HalError>;

    /// Drive the `pins` of the output port and park them at `level`.
    fn configure_output(&mut self, pins: u8, level: u8) -> Result<(), HalError>;

    /// Clear the timer event that started this conversion.
    fn acknowledge_tick(&mut self);

    /// Result of the conversion that just completed.
    fn read_input(&mut self) -> u16;

    /// Write the whole output port in one store.
    fn write_output(&mut self, value: u8);
}

/// Something the sampling interrupt can call once per tick.
pub trait TickHandler {
    fn on_tick(&mut self);
}
