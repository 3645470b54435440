//! Simulated front-end hardware.
//!
//! Models the reference board's timer, converter and output port as a small
//! register file plus a virtual base-clock cycle counter. Host tests and the
//! dry-run binary drive the dispatcher through it:
//!
//! ```ignore
//! let mut fe = FrontEnd::new(SimFrontEnd::new(), &shared, CONFIG);
//! fe.initialize(0, &mut modem)?;
//! fe.hal_mut().feed(&[512, 600, 400]);
//! fe.run(3);
//! ```

use crate::capture::AdcChannel;
use crate::config::{ADC_MAX, ADC_PRESCALER};
use crate::dispatcher::FrontEnd;
use crate::modem::Modem;

use super::{HalError, SampleHal};

/// Queued converter results.
const INPUT_QUEUE: usize = 64;

/// Register-level view of the simulated peripherals.
///
/// Two snapshots compare equal exactly when the hardware is configured the
/// same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimRegisters {
    /// Counter TOP, `None` while the timer is stopped
    pub reload: Option<u16>,
    /// Timer clock divider (1 = base clock)
    pub timer_prescaler: u8,
    /// Converter referenced to the supply rail
    pub adc_reference_supply: bool,
    /// Multiplexer input, `None` while the converter is off
    pub adc_mux: Option<u8>,
    /// Converter clock divider
    pub adc_prescaler: u8,
    /// Conversion started by the timer event
    pub adc_auto_trigger: bool,
    /// Conversion-complete interrupt enabled
    pub adc_interrupt: bool,
    /// Analog port direction (1 = output)
    pub analog_dir: u8,
    /// Analog port latch (1 = pull-up on an input)
    pub analog_port: u8,
    /// Digital input buffers disabled on the analog port
    pub digital_input_disable: u8,
    /// Output port direction (1 = output)
    pub output_dir: u8,
    /// Output port latch
    pub output_port: u8,
}

/// Simulated timer, converter and output port.
#[derive(Debug, Clone)]
pub struct SimFrontEnd {
    regs: SimRegisters,

    /// Base-clock cycles since the timer was programmed
    cycles: u64,
    next_overflow: u64,
    capture_flag: bool,
    adc_result: u16,

    input: [u16; INPUT_QUEUE],
    input_head: usize,
    input_len: usize,
    idle_input: u16,

    fail_next: Option<i32>,
    acks: AckLog,
    reads: u32,
    writes: u32,
}

/// Timing of acknowledged ticks, in base-clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AckLog {
    pub count: u32,
    pub first: u64,
    pub last: u64,
    pub min_interval: u64,
    pub max_interval: u64,
    /// Acknowledges with no pending timer event
    pub spurious: u32,
}

impl SimFrontEnd {
    /// Peripherals in their reset state.
    pub const fn new() -> Self {
        Self::with_registers(SimRegisters {
            reload: None,
            timer_prescaler: 0,
            adc_reference_supply: false,
            adc_mux: None,
            adc_prescaler: 0,
            adc_auto_trigger: false,
            adc_interrupt: false,
            analog_dir: 0,
            analog_port: 0,
            digital_input_disable: 0,
            output_dir: 0,
            output_port: 0,
        })
    }

    /// Peripherals as some earlier code left them.
    pub const fn with_registers(regs: SimRegisters) -> Self {
        Self {
            regs,
            cycles: 0,
            next_overflow: 0,
            capture_flag: false,
            adc_result: 0,
            input: [0; INPUT_QUEUE],
            input_head: 0,
            input_len: 0,
            idle_input: 512,
            fail_next: None,
            acks: AckLog {
                count: 0,
                first: 0,
                last: 0,
                min_interval: u64::MAX,
                max_interval: 0,
                spurious: 0,
            },
            reads: 0,
            writes: 0,
        }
    }

    #[inline]
    pub fn registers(&self) -> SimRegisters {
        self.regs
    }

    /// Current output port latch.
    #[inline]
    pub fn output(&self) -> u8 {
        self.regs.output_port
    }

    /// Queue converter results; returns how many fit.
    pub fn feed(&mut self, raw: &[u16]) -> usize {
        let mut accepted = 0;
        for &value in raw {
            if self.input_len == INPUT_QUEUE {
                break;
            }
            let slot = (self.input_head + self.input_len) % INPUT_QUEUE;
            self.input[slot] = value;
            self.input_len += 1;
            accepted += 1;
        }
        accepted
    }

    /// Converter result used once the queue is empty.
    pub fn set_idle_input(&mut self, raw: u16) {
        self.idle_input = raw;
    }

    /// Make the next configuration call fail with `code`.
    pub fn fail_next_configuration(&mut self, code: i32) {
        self.fail_next = Some(code);
    }

    /// Move time to the next timer overflow and complete a conversion.
    ///
    /// Returns the cycle of the overflow, or `None` while the timer or the
    /// auto-triggered converter is not set up.
    pub fn advance(&mut self) -> Option<u64> {
        let reload = self.regs.reload?;
        if !(self.regs.adc_auto_trigger && self.regs.adc_interrupt) {
            return None;
        }

        self.next_overflow += reload as u64 + 1;
        self.cycles = self.next_overflow;
        self.capture_flag = true;
        self.adc_result = self.next_input() & ADC_MAX;
        Some(self.cycles)
    }

    /// Base-clock cycles elapsed.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn acks(&self) -> AckLog {
        self.acks
    }

    /// Converter reads since creation.
    #[inline]
    pub fn reads(&self) -> u32 {
        self.reads
    }

    /// Output port writes since creation (configuration excluded).
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }

    fn next_input(&mut self) -> u16 {
        if self.input_len == 0 {
            return self.idle_input;
        }
        let value = self.input[self.input_head];
        self.input_head = (self.input_head + 1) % INPUT_QUEUE;
        self.input_len -= 1;
        value
    }

    fn check_injected_failure(&mut self) -> Result<(), HalError> {
        match self.fail_next.take() {
            Some(code) => Err(HalError::new(code)),
            None => Ok(()),
        }
    }
}

impl Default for SimFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleHal for SimFrontEnd {
    fn configure_clock(&mut self, reload: u16) -> Result<(), HalError> {
        self.check_injected_failure()?;
        self.regs.timer_prescaler = 1;
        self.regs.reload = Some(reload);
        // Reprogramming restarts the count from zero.
        self.next_overflow = self.cycles;
        Ok(())
    }

    fn configure_converter(&mut self, channel: AdcChannel) -> Result<(), HalError> {
        self.check_injected_failure()?;
        let mask = channel.pin_mask();
        self.regs.adc_reference_supply = true;
        self.regs.adc_mux = Some(channel.index());
        self.regs.analog_dir &= !mask;
        self.regs.analog_port &= !mask;
        self.regs.digital_input_disable |= mask;
        self.regs.adc_prescaler = ADC_PRESCALER;
        self.regs.adc_auto_trigger = true;
        self.regs.adc_interrupt = true;
        Ok(())
    }

    fn configure_output(&mut self, pins: u8, level: u8) -> Result<(), HalError> {
        self.check_injected_failure()?;
        self.regs.output_dir |= pins;
        self.regs.output_port = level;
        Ok(())
    }

    fn acknowledge_tick(&mut self) {
        if !self.capture_flag {
            self.acks.spurious += 1;
            return;
        }
        self.capture_flag = false;

        let now = self.cycles;
        if self.acks.count == 0 {
            self.acks.first = now;
        } else {
            let interval = now - self.acks.last;
            self.acks.min_interval = self.acks.min_interval.min(interval);
            self.acks.max_interval = self.acks.max_interval.max(interval);
        }
        self.acks.last = now;
        self.acks.count += 1;
    }

    fn read_input(&mut self) -> u16 {
        self.reads += 1;
        self.adc_result
    }

    fn write_output(&mut self, value: u8) {
        self.writes += 1;
        self.regs.output_port = value;
    }
}

impl<'a, M: Modem> FrontEnd<'a, SimFrontEnd, M> {
    /// Advance to the next overflow and run the dispatcher on it.
    ///
    /// Returns the cycle of the tick, `None` if the hardware is not ticking.
    pub fn step(&mut self) -> Option<u64> {
        let at = self.hal_mut().advance()?;
        self.on_tick();
        Some(at)
    }

    /// Run up to `ticks` ticks; returns how many ran.
    pub fn run(&mut self, ticks: u32) -> u32 {
        let mut ran = 0;
        while ran < ticks && self.step().is_some() {
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ticks_until_configured() {
        let mut sim = SimFrontEnd::new();
        assert_eq!(sim.advance(), None);

        sim.configure_clock(1665).unwrap();
        assert_eq!(sim.advance(), None);

        sim.configure_converter(AdcChannel::new(0).unwrap()).unwrap();
        assert_eq!(sim.advance(), Some(1666));
        assert_eq!(sim.advance(), Some(3332));
    }

    #[test]
    fn test_converter_touches_only_its_pin() {
        let mut sim = SimFrontEnd::with_registers(SimRegisters {
            analog_dir: 0xFF,
            analog_port: 0xFF,
            ..SimRegisters::default()
        });
        sim.configure_converter(AdcChannel::new(3).unwrap()).unwrap();

        let regs = sim.registers();
        assert_eq!(regs.analog_dir, 0xF7);
        assert_eq!(regs.analog_port, 0xF7);
        assert_eq!(regs.digital_input_disable, 0x08);
        assert_eq!(regs.adc_mux, Some(3));
        assert!(regs.adc_reference_supply);
        assert_eq!(regs.adc_prescaler, 16);
    }

    #[test]
    fn test_input_queue_then_idle() {
        let mut sim = SimFrontEnd::new();
        sim.configure_clock(100).unwrap();
        sim.configure_converter(AdcChannel::new(0).unwrap()).unwrap();
        assert_eq!(sim.feed(&[1, 2, 0xFFFF]), 3);

        let mut seen = [0u16; 4];
        for slot in seen.iter_mut() {
            sim.advance();
            *slot = sim.read_input();
        }
        assert_eq!(seen, [1, 2, ADC_MAX, 512]);
    }

    #[test]
    fn test_feed_stops_when_full() {
        let mut sim = SimFrontEnd::new();
        let raw = [0u16; INPUT_QUEUE + 5];
        assert_eq!(sim.feed(&raw), INPUT_QUEUE);
        assert_eq!(sim.feed(&[1]), 0);
    }

    #[test]
    fn test_spurious_ack_counted() {
        let mut sim = SimFrontEnd::new();
        sim.acknowledge_tick();
        assert_eq!(sim.acks().spurious, 1);
        assert_eq!(sim.acks().count, 0);
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let mut sim = SimFrontEnd::new();
        sim.fail_next_configuration(0x105);
        assert_eq!(sim.configure_clock(10), Err(HalError::new(0x105)));
        assert_eq!(sim.configure_clock(10), Ok(()));
    }
}
