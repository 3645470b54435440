//! Front-end error types
//!
//! Everything here is a configuration-time failure. The tick path has no
//! error surface: once `initialize` succeeds the dispatcher cannot fail.

use crate::hal::HalError;

/// Configuration rejected by `initialize`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// E01: Channel is not one of the multiplexer inputs
    InvalidChannel { channel: u8 },
    /// E02: Clock reload value does not fit the counter
    DivisorOverflow { reload: u32 },
    /// E03: Target rate cannot be produced from the (corrected) base clock
    RateUnreachable,
    /// E04: Discarded bits / mid-scale do not describe a signed sample
    InvalidSampleFormat,
    /// E05: Session already bound to a different channel
    ChannelLocked { bound: u8, requested: u8 },
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidChannel { .. } => "E01",
            Self::DivisorOverflow { .. } => "E02",
            Self::RateUnreachable => "E03",
            Self::InvalidSampleFormat => "E04",
            Self::ChannelLocked { .. } => "E05",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidChannel { .. } => "invalid ADC channel",
            Self::DivisorOverflow { .. } => "clock divisor overflow",
            Self::RateUnreachable => "sample rate unreachable",
            Self::InvalidSampleFormat => "invalid sample format",
            Self::ChannelLocked { .. } => "channel locked",
        }
    }

    /// Numeric payload stored as fault data
    pub fn data(&self) -> u32 {
        match *self {
            Self::InvalidChannel { channel } => channel as u32,
            Self::DivisorOverflow { reload } => reload,
            Self::ChannelLocked { requested, .. } => requested as u32,
            Self::RateUnreachable | Self::InvalidSampleFormat => 0,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        match *self {
            Self::InvalidChannel { channel } => write!(f, " ({})", channel),
            Self::DivisorOverflow { reload } => write!(f, " ({})", reload),
            Self::ChannelLocked { bound, requested } => {
                write!(f, " (bound {}, requested {})", bound, requested)
            }
            Self::RateUnreachable | Self::InvalidSampleFormat => Ok(()),
        }
    }
}

/// Failure of `FrontEnd::initialize`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// Rejected before touching hardware
    Config(ConfigError),
    /// Peripheral driver refused the configuration
    Hardware(HalError),
}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

impl From<HalError> for InitError {
    fn from(e: HalError) -> Self {
        InitError::Hardware(e)
    }
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "config: {}", e),
            InitError::Hardware(e) => write!(f, "hardware: {}", e),
        }
    }
}
