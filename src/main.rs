//! AfskFrontend - firmware entry point
//!
//! On the device:
//! 1. Bring up the console UART for the log drain
//! 2. Initialize the front-end (clock, converter, output port)
//! 3. Hook the dispatcher to the timer alarm
//! 4. Foreground loop: drain logs, hold the transmitter off on fault
//!
//! On the host the same front-end runs for one simulated second against
//! the simulated backend.

#[cfg(target_os = "espidf")]
mod device {
    use afsk_frontend::config::DEFAULT_CHANNEL;
    use afsk_frontend::hal::esp::{EspFrontEnd, EspPins};
    use afsk_frontend::log_drain::{self, uart::{UartLoggerConfig, UartSink}};
    use afsk_frontend::{rt_error, rt_info, FrontEnd, NullModem, SharedState, CONFIG};

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::peripherals::Peripherals;

    static SHARED: SharedState = SharedState::new();

    /// Foreground drain period.
    const DRAIN_PERIOD_MS: u32 = 100;

    pub fn main() {
        esp_idf_svc::sys::link_patches();

        let Ok(peripherals) = Peripherals::take() else {
            return;
        };
        let Ok(mut console) =
            UartSink::new(peripherals.uart1, peripherals.pins.gpio6, &UartLoggerConfig::default())
        else {
            return;
        };

        rt_info!(SHARED.bg_log, 0, "{}", env!("VERSION_STRING"));

        // The demodulator is linked in by the application; until then the
        // front-end runs against a modem that stays silent.
        let modem: &'static mut NullModem = Box::leak(Box::new(NullModem::new()));
        let front_end: &'static mut FrontEnd<'static, EspFrontEnd, NullModem> =
            Box::leak(Box::new(FrontEnd::new(EspFrontEnd::new(EspPins::default()), &SHARED, CONFIG)));

        if front_end.initialize(DEFAULT_CHANNEL, modem).is_ok() {
            let timer = front_end.hal().timer();
            // SAFETY: front_end is leaked and never touched again from here on.
            if let Err(e) = unsafe { EspFrontEnd::start(timer, front_end as *mut _) } {
                SHARED.fault.set_init(&e.into());
                rt_error!(SHARED.bg_log, 0, "timer start failed: {}", e);
            }
        }

        loop {
            if SHARED.fault.is_active() {
                SHARED.tx.release();
            }
            let _ = log_drain::drain_shared(&SHARED, &mut console);
            FreeRtos::delay_ms(DRAIN_PERIOD_MS);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use afsk_frontend::config::{DEFAULT_CHANNEL, SAMPLE_RATE_HZ};
    use afsk_frontend::hal::SimFrontEnd;
    use afsk_frontend::log_drain;
    use afsk_frontend::{FrontEnd, NullModem, SharedState, CONFIG};

    pub fn main() {
        println!("{} (simulated)", env!("VERSION_STRING"));

        let shared = SharedState::new();
        let mut modem = NullModem::new();
        let mut front_end = FrontEnd::new(SimFrontEnd::new(), &shared, CONFIG);

        if let Err(e) = front_end.initialize(DEFAULT_CHANNEL, &mut modem) {
            eprintln!("initialize failed: {}", e);
            std::process::exit(1);
        }

        // One second: quiet, keyed idle (tx-delay), modulating, quiet again.
        let phase = SAMPLE_RATE_HZ / 4;
        front_end.run(phase);
        shared.tx.set_key(true);
        front_end.run(phase);
        shared.tx.set_transmit(true);
        front_end.run(phase);
        shared.tx.release();
        front_end.run(SAMPLE_RATE_HZ - 3 * phase);

        let mut out = String::new();
        let _ = log_drain::drain_shared(&shared, &mut out);
        print!("{}", out);

        let stats = shared.counters.snapshot();
        let acks = front_end.hal().acks();
        println!(
            "ticks={} modulating={} modem_samples={} cycles={} interval={}..{}",
            stats.ticks,
            stats.modulating,
            front_end.modem().map_or(0, NullModem::samples),
            front_end.hal().cycles(),
            acks.min_interval,
            acks.max_interval,
        );
    }
}

fn main() {
    #[cfg(target_os = "espidf")]
    device::main();
    #[cfg(not(target_os = "espidf"))]
    host::main();
}
