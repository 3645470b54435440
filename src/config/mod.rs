//! Module: config
//!
//! Purpose: Compile-time configuration of the AFSK front-end.
//!
//! Architecture:
//! - Sample rate and frequency correction are build constants, never negotiated
//! - Board crystal trims are picked with the `board-m1` / `board-m2` features
//! - `CONFIG` is validated at compile time (see the const assertion below)
//!
//! Safety: Safe. Plain `Copy` data, no interior mutability.

use crate::capture::SampleFormat;
use crate::clock;
use crate::error::ConfigError;

/// Target sampling rate shared by capture and playback.
pub const SAMPLE_RATE_HZ: u32 = 9600;

/// Nominal timer base clock (no prescaler).
pub const BASE_CLOCK_HZ: u32 = 16_000_000;

/// Measured crystal trim of the M1 reference board.
pub const BOARD_M1_CORRECTION_HZ: i32 = 9_500;

/// Measured crystal trim of the M2 reference board.
pub const BOARD_M2_CORRECTION_HZ: i32 = 40_000;

/// Frequency correction applied to the divisor calculation.
#[cfg(feature = "board-m1")]
pub const FREQUENCY_CORRECTION_HZ: i32 = BOARD_M1_CORRECTION_HZ;
#[cfg(all(feature = "board-m2", not(feature = "board-m1")))]
pub const FREQUENCY_CORRECTION_HZ: i32 = BOARD_M2_CORRECTION_HZ;
#[cfg(not(any(feature = "board-m1", feature = "board-m2")))]
pub const FREQUENCY_CORRECTION_HZ: i32 = 0;

/// Number of inputs on the analog multiplexer.
pub const ADC_CHANNELS: u8 = 8;

/// Converter resolution.
pub const ADC_BITS: u8 = 10;

/// Largest raw converter magnitude.
pub const ADC_MAX: u16 = (1 << ADC_BITS) - 1;

/// Low-order bits dropped from each conversion (fast converter clock, reduced precision).
pub const DISCARDED_BITS: u8 = 2;

/// Mid-scale of the 8-bit-equivalent range left after the shift.
pub const MIDSCALE: i16 = 128;

/// Channel used by the firmware binary.
pub const DEFAULT_CHANNEL: u8 = 0;

/// Converter clock prescaler (16 MHz / 16 = 1 MHz).
pub const ADC_PRESCALER: u8 = 16;

/// Front-end configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontEndConfig {
    /// Nominal base clock of the sampling timer
    pub base_clock_hz: u32,
    /// Signed trim added to the base clock before dividing
    pub correction_hz: i32,
    /// Target tick rate
    pub sample_rate_hz: u32,
    /// Raw-to-signed conversion
    pub format: SampleFormat,
}

impl FrontEndConfig {
    /// Reference design: 16 MHz, 9600 Hz, 10-bit converter reduced to 8 bits.
    pub const fn reference() -> Self {
        Self {
            base_clock_hz: BASE_CLOCK_HZ,
            correction_hz: FREQUENCY_CORRECTION_HZ,
            sample_rate_hz: SAMPLE_RATE_HZ,
            format: SampleFormat::new(DISCARDED_BITS, MIDSCALE),
        }
    }

    /// Same configuration with a different crystal trim.
    pub const fn with_correction(mut self, correction_hz: i32) -> Self {
        self.correction_hz = correction_hz;
        self
    }

    /// Same configuration with a different base clock.
    pub const fn with_base_clock(mut self, base_clock_hz: u32) -> Self {
        self.base_clock_hz = base_clock_hz;
        self
    }

    /// Same configuration with a different raw-to-signed conversion.
    pub const fn with_format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    /// Check every constraint that `initialize` relies on.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = clock::reload_value(self.base_clock_hz, self.correction_hz, self.sample_rate_hz) {
            return Err(e);
        }
        self.format.validate()
    }
}

impl Default for FrontEndConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Build configuration.
pub const CONFIG: FrontEndConfig = FrontEndConfig::reference();

const _: () = assert!(CONFIG.validate().is_ok(), "build configuration rejected");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        assert_eq!(FrontEndConfig::reference().validate(), Ok(()));
        assert_eq!(FrontEndConfig::default(), FrontEndConfig::reference());
    }

    #[test]
    fn test_board_presets_are_valid() {
        for trim in [BOARD_M1_CORRECTION_HZ, BOARD_M2_CORRECTION_HZ] {
            let cfg = FrontEndConfig::reference().with_correction(trim);
            assert_eq!(cfg.validate(), Ok(()));
        }
    }

    #[test]
    fn test_bad_format_rejected() {
        let cfg = FrontEndConfig::reference().with_format(SampleFormat::new(11, 0));
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidSampleFormat));
    }

    #[test]
    fn test_slow_base_clock_rejected() {
        let cfg = FrontEndConfig::reference().with_base_clock(9600);
        assert_eq!(cfg.validate(), Err(ConfigError::RateUnreachable));
    }
}
