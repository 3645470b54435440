//! Transmit key control (PTT)
//!
//! Two independent flags written by the link layer and sampled once per
//! tick by the playback path:
//!
//! | transmit | key   | state       | port |
//! |----------|-------|-------------|------|
//! | false    | false | Quiet       | 128  |
//! | false    | true  | KeyedIdle   | 136  |
//! | true     | any   | Modulating  | (s & 0xF0) \| PTT |
//!
//! No timing, no debouncing: the tx-delay and tail are the caller's business.

use core::sync::atomic::{AtomicBool, Ordering};

/// Observable transmitter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Receiving, line at 0 V, PTT released
    Quiet,
    /// PTT asserted, silent carrier
    KeyedIdle,
    /// PTT asserted, modem output on the DAC
    Modulating,
}

impl TxState {
    /// Resolve the two flags.
    ///
    /// Transmit without key still modulates: the key bit travels with every
    /// modulated write.
    #[inline]
    pub const fn from_flags(transmit: bool, key: bool) -> Self {
        match (transmit, key) {
            (true, _) => TxState::Modulating,
            (false, true) => TxState::KeyedIdle,
            (false, false) => TxState::Quiet,
        }
    }

    /// Whether the PTT line is asserted in this state.
    #[inline]
    pub const fn ptt_asserted(self) -> bool {
        !matches!(self, TxState::Quiet)
    }
}

/// Shared transmit flags
///
/// Each flag is a single atomic byte: the interrupt reads it with one load,
/// no critical section.
pub struct TxControl {
    transmit: AtomicBool,
    key: AtomicBool,
}

impl TxControl {
    /// Create new control (quiet)
    pub const fn new() -> Self {
        Self {
            transmit: AtomicBool::new(false),
            key: AtomicBool::new(false),
        }
    }

    /// Start or stop pulling samples from the modem
    #[inline]
    pub fn set_transmit(&self, on: bool) {
        self.transmit.store(on, Ordering::Release);
    }

    #[inline]
    pub fn transmit_enabled(&self) -> bool {
        self.transmit.load(Ordering::Acquire)
    }

    /// Hold the key line while not modulating
    #[inline]
    pub fn set_key(&self, held: bool) {
        self.key.store(held, Ordering::Release);
    }

    #[inline]
    pub fn key_held(&self) -> bool {
        self.key.load(Ordering::Acquire)
    }

    /// Current state as the next tick will see it
    #[inline]
    pub fn state(&self) -> TxState {
        TxState::from_flags(self.transmit_enabled(), self.key_held())
    }

    /// Drop both flags
    #[inline]
    pub fn release(&self) {
        self.transmit.store(false, Ordering::Release);
        self.key.store(false, Ordering::Release);
    }
}

impl Default for TxControl {
    fn default() -> Self {
        Self::new()
    }
}
