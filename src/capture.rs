//! Capture path
//!
//! The converter is auto-triggered by the sampling clock; on each completed
//! conversion the raw magnitude is reduced and re-biased around zero before
//! it goes to the modem:
//!
//! ```text
//! sample = (raw >> discarded_bits) - midscale
//! ```
//!
//! The audio input arrives AC-coupled on a DC bias of half the supply, so
//! mid-scale maps to 0.

use crate::config::{ADC_BITS, ADC_CHANNELS, ADC_MAX};
use crate::error::ConfigError;
use crate::hal::{HalError, SampleHal};
use crate::modem::Modem;

/// Analog multiplexer input, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Validate a channel index against the multiplexer.
    pub const fn new(channel: u8) -> Result<Self, ConfigError> {
        if channel < ADC_CHANNELS {
            Ok(Self(channel))
        } else {
            Err(ConfigError::InvalidChannel { channel })
        }
    }

    /// Multiplexer index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Port bit of the pin behind this channel.
    #[inline]
    pub const fn pin_mask(self) -> u8 {
        1 << self.0
    }
}

/// Raw-to-signed sample conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    discarded_bits: u8,
    midscale: i16,
}

impl SampleFormat {
    pub const fn new(discarded_bits: u8, midscale: i16) -> Self {
        Self { discarded_bits, midscale }
    }

    #[inline]
    pub const fn discarded_bits(&self) -> u8 {
        self.discarded_bits
    }

    #[inline]
    pub const fn midscale(&self) -> i16 {
        self.midscale
    }

    /// The shift must leave at least one bit and mid-scale must be a reachable
    /// reading of the reduced range, so full scale stays non-negative.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.discarded_bits >= ADC_BITS {
            return Err(ConfigError::InvalidSampleFormat);
        }
        let range = 1i16 << (ADC_BITS - self.discarded_bits);
        if self.midscale < 0 || self.midscale >= range {
            return Err(ConfigError::InvalidSampleFormat);
        }
        Ok(())
    }

    /// Convert one raw conversion result.
    #[inline]
    pub const fn recenter(&self, raw: u16) -> i16 {
        recenter(raw, self.discarded_bits, self.midscale)
    }
}

/// `(raw >> discarded_bits) - midscale`, with `raw` limited to the converter width.
#[inline]
pub const fn recenter(raw: u16, discarded_bits: u8, midscale: i16) -> i16 {
    ((raw & ADC_MAX) >> discarded_bits) as i16 - midscale
}

/// Capture side of the front-end, bound to one channel for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePath {
    channel: AdcChannel,
    format: SampleFormat,
}

impl CapturePath {
    pub const fn new(channel: AdcChannel, format: SampleFormat) -> Self {
        Self { channel, format }
    }

    #[inline]
    pub const fn channel(&self) -> AdcChannel {
        self.channel
    }

    /// Reference, multiplexer, pin mode and auto-trigger.
    pub fn configure<H: SampleHal>(&self, hal: &mut H) -> Result<(), HalError> {
        hal.configure_converter(self.channel)
    }

    /// Read the finished conversion and hand it to the modem.
    ///
    /// Returns the value that was delivered.
    #[inline]
    pub fn service<H: SampleHal, M: Modem + ?Sized>(&self, hal: &mut H, modem: &mut M) -> i16 {
        let sample = self.format.recenter(hal.read_input());
        modem.on_input_sample(sample);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DISCARDED_BITS, MIDSCALE};

    #[test]
    fn test_channel_range() {
        for ch in 0..ADC_CHANNELS {
            assert_eq!(AdcChannel::new(ch).map(AdcChannel::index), Ok(ch));
        }
        assert_eq!(AdcChannel::new(8), Err(ConfigError::InvalidChannel { channel: 8 }));
        assert_eq!(AdcChannel::new(255), Err(ConfigError::InvalidChannel { channel: 255 }));
    }

    #[test]
    fn test_pin_mask() {
        assert_eq!(AdcChannel::new(0).unwrap().pin_mask(), 0x01);
        assert_eq!(AdcChannel::new(7).unwrap().pin_mask(), 0x80);
    }

    #[test]
    fn test_recenter_full_range() {
        let format = SampleFormat::new(DISCARDED_BITS, MIDSCALE);
        for raw in 0..=ADC_MAX {
            let expected = (raw >> DISCARDED_BITS) as i16 - MIDSCALE;
            assert_eq!(format.recenter(raw), expected, "raw {}", raw);
        }
        assert_eq!(format.recenter(0), -128);
        assert_eq!(format.recenter(ADC_MAX), 127);
    }

    #[test]
    fn test_midscale_is_zero() {
        // 10-bit mid-scale with the reference shift
        assert_eq!(recenter(512, 2, 128), 0);
        // 8-bit-equivalent input, no shift
        assert_eq!(recenter(128, 0, 128), 0);
    }

    #[test]
    fn test_reference_scenarios() {
        assert_eq!(recenter(255, 2, 128), -65);
        assert_eq!(recenter(1023, 2, 128), 127);
    }

    #[test]
    fn test_bits_above_converter_width_ignored() {
        assert_eq!(recenter(0xFC00 | 512, 2, 128), 0);
    }

    #[test]
    fn test_format_validation() {
        assert_eq!(SampleFormat::new(2, 128).validate(), Ok(()));
        assert_eq!(SampleFormat::new(0, 512).validate(), Ok(()));
        assert_eq!(SampleFormat::new(2, 255).validate(), Ok(()));
        // Full scale would still read negative
        assert_eq!(SampleFormat::new(2, 256).validate(), Err(ConfigError::InvalidSampleFormat));
        assert_eq!(SampleFormat::new(0, 1024).validate(), Err(ConfigError::InvalidSampleFormat));
        assert_eq!(SampleFormat::new(10, 0).validate(), Err(ConfigError::InvalidSampleFormat));
        assert_eq!(SampleFormat::new(2, 300).validate(), Err(ConfigError::InvalidSampleFormat));
        assert_eq!(SampleFormat::new(2, -1).validate(), Err(ConfigError::InvalidSampleFormat));
    }
}
