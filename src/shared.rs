//! State shared between foreground code and the sampling interrupt.
//!
//! Everything in here is a single-word atomic or a lock-free ring. The
//! interrupt never takes a lock and never observes a half-finished update.
//!
//! ```ignore
//! static SHARED: SharedState = SharedState::new();
//!
//! // link layer (foreground)
//! SHARED.tx.set_key(true);       // tx-delay: carrier up
//! SHARED.tx.set_transmit(true);  // frame on the air
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use crate::fault::FaultState;
use crate::logging::LogStream;
use crate::ptt::TxControl;

/// Tick counters, written only by the interrupt.
pub struct TickCounters {
    ticks: AtomicU32,
    modulating: AtomicU32,
    unbound: AtomicU32,
}

impl TickCounters {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            modulating: AtomicU32::new(0),
            unbound: AtomicU32::new(0),
        }
    }

    /// Count one tick, returning its number.
    ///
    /// Single writer: a plain load/store pair, no read-modify-write needed.
    #[inline]
    pub(crate) fn begin_tick(&self) -> u32 {
        let tick = self.ticks.load(Ordering::Relaxed);
        self.ticks.store(tick.wrapping_add(1), Ordering::Relaxed);
        tick
    }

    #[inline]
    pub(crate) fn count_modulating(&self) {
        let n = self.modulating.load(Ordering::Relaxed);
        self.modulating.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn count_unbound(&self) {
        let n = self.unbound.load(Ordering::Relaxed);
        self.unbound.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    /// Ticks dispatched so far; also the log time base.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TickStats {
        TickStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            modulating: self.modulating.load(Ordering::Relaxed),
            unbound: self.unbound.load(Ordering::Relaxed),
        }
    }
}

impl Default for TickCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy of the tick counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Dispatcher invocations
    pub ticks: u32,
    /// Ticks that pulled a sample from the modem
    pub modulating: u32,
    /// Ticks that fired before a modem was bound
    pub unbound: u32,
}

/// Everything foreground code and the interrupt both touch.
pub struct SharedState {
    /// Transmit / key flags
    pub tx: TxControl,
    pub counters: TickCounters,
    pub fault: FaultState,
    /// Log ring owned by the interrupt
    pub rt_log: LogStream,
    /// Log ring owned by foreground code
    pub bg_log: LogStream,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            tx: TxControl::new(),
            counters: TickCounters::new(),
            fault: FaultState::new(),
            rt_log: LogStream::new(),
            bg_log: LogStream::new(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
