//! Foreground log drain.
//!
//! Empties the interrupt ring first, then the foreground ring, and renders
//! each entry as
//!
//! ```text
//! [      tick] LEVEL: message
//! ```
//!
//! On the device the lines go out on a TX-only UART; on the host any
//! `core::fmt::Write` will do.

use core::fmt::Write;

use crate::logging::{LogEntry, LogStream};
use crate::shared::SharedState;

fn write_entry<W: Write>(out: &mut W, entry: &LogEntry) -> core::fmt::Result {
    writeln!(out, "[{:10}] {}: {}", entry.tick, entry.level.as_str(), entry.text())
}

/// Write every pending entry of one stream; returns how many were written.
pub fn drain_stream<W: Write, const N: usize>(
    stream: &LogStream<N>,
    out: &mut W,
) -> Result<u32, core::fmt::Error> {
    let mut written = 0;
    while let Some(entry) = stream.drain() {
        write_entry(out, &entry)?;
        written += 1;
    }
    Ok(written)
}

/// Drain both rings of `shared` and report drops since the last call.
pub fn drain_shared<W: Write>(shared: &SharedState, out: &mut W) -> Result<u32, core::fmt::Error> {
    let written = drain_stream(&shared.rt_log, out)? + drain_stream(&shared.bg_log, out)?;

    let rt_dropped = shared.rt_log.dropped();
    let bg_dropped = shared.bg_log.dropped();
    if rt_dropped > 0 || bg_dropped > 0 {
        writeln!(out, "[WARN] log dropped: rt={}, bg={}", rt_dropped, bg_dropped)?;
        shared.rt_log.reset_dropped();
        shared.bg_log.reset_dropped();
    }

    Ok(written)
}

#[cfg(target_os = "espidf")]
pub mod uart {
    //! TX-only console UART for the drained log.

    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripheral::Peripheral;
    use esp_idf_svc::hal::uart::{self, UartTxDriver};
    use esp_idf_svc::sys::EspError;

    /// UART configuration for logging.
    pub struct UartLoggerConfig {
        pub baud_rate: u32,
    }

    impl Default for UartLoggerConfig {
        fn default() -> Self {
            Self { baud_rate: 115200 }
        }
    }

    /// `fmt::Write` adapter over the UART driver.
    pub struct UartSink<'d> {
        driver: UartTxDriver<'d>,
    }

    impl<'d> UartSink<'d> {
        pub fn new(
            uart: impl Peripheral<P = uart::UART1> + 'd,
            tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
            config: &UartLoggerConfig,
        ) -> Result<Self, EspError> {
            let uart_config = uart::config::Config::default()
                .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

            let driver = UartTxDriver::new(
                uart,
                tx_pin,
                Option::<gpio::AnyIOPin>::None, // CTS
                Option::<gpio::AnyIOPin>::None, // RTS
                &uart_config,
            )?;
            Ok(Self { driver })
        }
    }

    impl core::fmt::Write for UartSink<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.driver.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }
}
