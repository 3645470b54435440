//! Fault latch for the AFSK front-end.
//!
//! A front-end that samples at the wrong rate corrupts every packet on the
//! channel. A front-end that stays quiet corrupts nothing. Any configuration
//! or peripheral failure is latched here so the foreground loop can hold
//! the transmitter off and report it.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::error::InitError;

/// Fault codes indicating why the front-end is not sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// `initialize` rejected the configuration.
    /// Data: the rejected value (channel, reload).
    ConfigRejected = 1,

    /// Peripheral driver refused the configuration.
    /// Data: raw platform error code.
    HardwareFault = 2,

    /// A tick fired before a modem was bound.
    /// Data: tick number.
    UnboundTick = 3,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::ConfigRejected,
            2 => FaultCode::HardwareFault,
            3 => FaultCode::UnboundTick,
            _ => FaultCode::None,
        }
    }
}

impl From<&InitError> for FaultCode {
    fn from(e: &InitError) -> Self {
        match e {
            InitError::Config(_) => FaultCode::ConfigRejected,
            InitError::Hardware(_) => FaultCode::HardwareFault,
        }
    }
}

/// Lock-free fault state, written from either context.
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    data: AtomicU32,
    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch a fault. Code and data are published before the active flag.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    /// Latch an initialisation failure.
    pub fn set_init(&self, e: &InitError) {
        let data = match e {
            InitError::Config(c) => c.data(),
            InitError::Hardware(h) => h.code() as u32,
        };
        self.set(FaultCode::from(e), data);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Only meaningful while `is_active()`.
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag. The counter is kept.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::hal::HalError;

    #[test]
    fn test_fault_state_basic() {
        let fault = FaultState::new();

        assert!(!fault.is_active());
        assert_eq!(fault.code(), FaultCode::None);
        assert_eq!(fault.count(), 0);

        fault.set(FaultCode::UnboundTick, 42);

        assert!(fault.is_active());
        assert_eq!(fault.code(), FaultCode::UnboundTick);
        assert_eq!(fault.data(), 42);
        assert_eq!(fault.count(), 1);

        fault.clear();

        assert!(!fault.is_active());
        assert_eq!(fault.count(), 1);
    }

    #[test]
    fn test_init_errors_map_to_codes() {
        let fault = FaultState::new();

        fault.set_init(&InitError::Config(ConfigError::InvalidChannel { channel: 9 }));
        assert_eq!(fault.code(), FaultCode::ConfigRejected);
        assert_eq!(fault.data(), 9);

        fault.set_init(&InitError::Hardware(HalError::new(0x103)));
        assert_eq!(fault.code(), FaultCode::HardwareFault);
        assert_eq!(fault.data(), 0x103);
        assert_eq!(fault.count(), 2);
    }

    #[test]
    fn test_unknown_code_reads_as_none() {
        assert_eq!(FaultCode::from_u8(200), FaultCode::None);
    }
}
