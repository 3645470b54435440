//! Sampling clock
//!
//! One free-running counter, clocked straight from the base clock (no
//! prescaler), overflows at the sample rate. Each overflow is one tick for
//! both the capture and the playback path.
//!
//! ```text
//! reload = (base_clock_hz + correction_hz) / sample_rate_hz - 1
//! period = reload + 1 base-clock cycles
//! ```

use crate::config::FrontEndConfig;
use crate::error::ConfigError;

/// Largest reload value the 16-bit counter can hold.
pub const COUNTER_MAX: u32 = u16::MAX as u32;

/// Compute the counter reload value for a target rate.
///
/// The corrected base clock must be positive and the result must fit the
/// counter; a reload of zero would overflow every cycle and is rejected too.
pub const fn reload_value(
    base_clock_hz: u32,
    correction_hz: i32,
    sample_rate_hz: u32,
) -> Result<u16, ConfigError> {
    let clock = base_clock_hz as i64 + correction_hz as i64;
    if sample_rate_hz == 0 || clock <= 0 {
        return Err(ConfigError::RateUnreachable);
    }

    let reload = clock / sample_rate_hz as i64 - 1;
    if reload < 1 {
        return Err(ConfigError::RateUnreachable);
    }
    if reload > COUNTER_MAX as i64 {
        return Err(ConfigError::DivisorOverflow {
            reload: if reload > u32::MAX as i64 { u32::MAX } else { reload as u32 },
        });
    }

    Ok(reload as u16)
}

/// Programmed sampling clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingClock {
    reload: u16,
    /// Base clock with the correction applied (what the crystal really runs at)
    actual_clock_hz: u32,
    target_hz: u32,
}

impl SamplingClock {
    /// Derive the clock from the configuration.
    pub const fn new(config: &FrontEndConfig) -> Result<Self, ConfigError> {
        match reload_value(config.base_clock_hz, config.correction_hz, config.sample_rate_hz) {
            Ok(reload) => Ok(Self {
                reload,
                actual_clock_hz: (config.base_clock_hz as i64 + config.correction_hz as i64) as u32,
                target_hz: config.sample_rate_hz,
            }),
            Err(e) => Err(e),
        }
    }

    /// Value written to the counter's TOP register.
    #[inline]
    pub const fn reload(&self) -> u16 {
        self.reload
    }

    /// Base-clock cycles between two ticks.
    #[inline]
    pub const fn period_cycles(&self) -> u32 {
        self.reload as u32 + 1
    }

    /// Target tick rate.
    #[inline]
    pub const fn target_hz(&self) -> u32 {
        self.target_hz
    }

    /// Rate the divisor really produces, in milli-hertz.
    pub const fn achieved_mhz(&self) -> u64 {
        (self.actual_clock_hz as u64 * 1000) / self.period_cycles() as u64
    }

    /// Achieved minus target rate, in milli-hertz.
    pub const fn error_mhz(&self) -> i64 {
        self.achieved_mhz() as i64 - self.target_hz as i64 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BOARD_M1_CORRECTION_HZ, BOARD_M2_CORRECTION_HZ};

    #[test]
    fn test_reference_reload() {
        // 16 MHz / 9600 = 1666.67 -> 1666 - 1
        assert_eq!(reload_value(16_000_000, 0, 9600), Ok(1665));
    }

    #[test]
    fn test_correction_range_fits_counter() {
        for trim in [
            0,
            BOARD_M1_CORRECTION_HZ,
            -BOARD_M1_CORRECTION_HZ,
            BOARD_M2_CORRECTION_HZ,
            -BOARD_M2_CORRECTION_HZ,
        ] {
            let reload = reload_value(16_000_000, trim, 9600).unwrap();
            assert!(reload as u32 <= COUNTER_MAX);
            assert!(reload > 1600 && reload < 1700, "trim {} gave {}", trim, reload);
        }
    }

    #[test]
    fn test_m1_trim_pulls_rate_towards_target() {
        // Board clock really runs at 16.0095 MHz
        assert_eq!(reload_value(16_000_000, BOARD_M1_CORRECTION_HZ, 9600), Ok(1666));
    }

    #[test]
    fn test_overflow_rejected() {
        // 1 GHz / 9600 - 1 = 104165 > 65535
        assert_eq!(
            reload_value(1_000_000_000, 0, 9600),
            Err(ConfigError::DivisorOverflow { reload: 104_165 })
        );
    }

    #[test]
    fn test_largest_base_clock_that_fits() {
        // (65535 + 2) * 9600 is the first clock that no longer fits
        let edge = (COUNTER_MAX + 2) * 9600;
        assert_eq!(reload_value(edge - 1, 0, 9600), Ok(u16::MAX));
        assert!(reload_value(edge, 0, 9600).is_err());
    }

    #[test]
    fn test_unreachable_rates() {
        assert_eq!(reload_value(16_000_000, 0, 0), Err(ConfigError::RateUnreachable));
        assert_eq!(reload_value(1000, -1000, 9600), Err(ConfigError::RateUnreachable));
        assert_eq!(reload_value(9600, 0, 9600), Err(ConfigError::RateUnreachable));
    }

    #[test]
    fn test_achieved_rate_within_one_cycle() {
        let clock = SamplingClock::new(&FrontEndConfig::reference().with_correction(0)).unwrap();
        assert_eq!(clock.period_cycles(), 1666);
        // 16e6 / 1666 = 9603.841 Hz
        assert_eq!(clock.achieved_mhz(), 9_603_841);
        assert_eq!(clock.error_mhz(), 3_841);
    }
}
