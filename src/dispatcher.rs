//! Interrupt-time dispatcher
//!
//! One routine, bound to the conversion-complete event, runs once per
//! sampling-clock tick:
//!
//! ```text
//! tick ─▶ acknowledge timer event ─▶ capture (modem input) ─▶ playback (port write)
//! ```
//!
//! Capture always runs before playback, so the sample just taken reaches the
//! modem before any output decision for the same tick. The whole routine is
//! straight-line: no allocation, no locks, no loops over data.

use crate::capture::{AdcChannel, CapturePath};
use crate::clock::SamplingClock;
use crate::config::FrontEndConfig;
use crate::error::{ConfigError, InitError};
use crate::fault::FaultCode;
use crate::hal::{SampleHal, TickHandler};
use crate::modem::Modem;
use crate::playback::{self, QUIET_LEVEL};
use crate::ptt::TxState;
use crate::shared::SharedState;
use crate::{rt_debug, rt_error, rt_info, rt_warn};

/// Per-session binding made by `initialize`.
struct Session<'a, M> {
    modem: &'a mut M,
    capture: CapturePath,
    clock: SamplingClock,
}

/// The AFSK front-end: sampling clock, capture path, playback path.
///
/// The modem is borrowed for the whole session, never owned.
pub struct FrontEnd<'a, H: SampleHal, M: Modem> {
    hal: H,
    shared: &'a SharedState,
    config: FrontEndConfig,
    session: Option<Session<'a, M>>,
    last_state: TxState,
}

impl<'a, H: SampleHal, M: Modem> FrontEnd<'a, H, M> {
    /// Wrap the peripherals. Nothing is programmed until `initialize`.
    pub const fn new(hal: H, shared: &'a SharedState, config: FrontEndConfig) -> Self {
        Self {
            hal,
            shared,
            config,
            session: None,
            last_state: TxState::Quiet,
        }
    }

    /// Program clock, converter and output port and bind the modem.
    ///
    /// Must run while the sampling interrupt is not yet firing. Calling it
    /// again with the same channel reprograms the same state; a different
    /// channel is rejected and the current session keeps running. Any other
    /// failure is latched in the fault state; success clears it.
    pub fn initialize(&mut self, channel: u8, modem: &'a mut M) -> Result<(), InitError> {
        let result = self.try_initialize(channel, modem);
        let tick = self.shared.counters.ticks();
        match &result {
            Ok(()) => self.shared.fault.clear(),
            // The running session is untouched, nothing to latch.
            Err(e @ InitError::Config(ConfigError::ChannelLocked { .. })) => {
                rt_warn!(self.shared.bg_log, tick, "init rejected: {}", e);
            }
            Err(e) => {
                self.shared.fault.set_init(e);
                rt_error!(self.shared.bg_log, tick, "init failed: {}", e);
            }
        }
        result
    }

    fn try_initialize(&mut self, channel: u8, modem: &'a mut M) -> Result<(), InitError> {
        let channel = AdcChannel::new(channel)?;
        if let Some(bound) = self.channel() {
            if bound != channel {
                return Err(ConfigError::ChannelLocked {
                    bound: bound.index(),
                    requested: channel.index(),
                }
                .into());
            }
        }

        self.config.validate()?;
        let clock = SamplingClock::new(&self.config)?;
        let capture = CapturePath::new(channel, self.config.format);

        // Port first so the line is parked before the first conversion can fire.
        playback::configure(&mut self.hal)?;
        self.hal.configure_clock(clock.reload())?;
        capture.configure(&mut self.hal)?;

        let achieved = clock.achieved_mhz();
        rt_info!(
            self.shared.bg_log,
            self.shared.counters.ticks(),
            "init ch={} reload={} rate={}.{:03}Hz err={}mHz",
            channel.index(),
            clock.reload(),
            achieved / 1000,
            achieved % 1000,
            clock.error_mhz()
        );

        self.session = Some(Session { modem, capture, clock });
        Ok(())
    }

    /// Service one tick. Called from the sampling interrupt only.
    #[inline]
    pub fn on_tick(&mut self) {
        self.hal.acknowledge_tick();
        let tick = self.shared.counters.begin_tick();

        let Some(session) = self.session.as_mut() else {
            // Conversion still has to be consumed; hold the line quiet.
            let _ = self.hal.read_input();
            self.hal.write_output(QUIET_LEVEL);
            self.shared.counters.count_unbound();
            if !self.shared.fault.is_active() {
                self.shared.fault.set(FaultCode::UnboundTick, tick);
            }
            return;
        };

        session.capture.service(&mut self.hal, &mut *session.modem);
        let state = playback::service(&self.shared.tx, &mut self.hal, &mut *session.modem);

        if state == TxState::Modulating {
            self.shared.counters.count_modulating();
        }
        if state != self.last_state {
            rt_debug!(self.shared.rt_log, tick, "tx {:?} -> {:?}", self.last_state, state);
            self.last_state = state;
        }
    }

    /// Whether `initialize` has bound a modem.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// Channel fixed by `initialize`.
    pub fn channel(&self) -> Option<AdcChannel> {
        self.session.as_ref().map(|s| s.capture.channel())
    }

    /// Clock programmed by `initialize`.
    pub fn clock(&self) -> Option<SamplingClock> {
        self.session.as_ref().map(|s| s.clock)
    }

    /// The bound modem.
    pub fn modem(&self) -> Option<&M> {
        self.session.as_ref().map(|s| &*s.modem)
    }

    pub fn config(&self) -> &FrontEndConfig {
        &self.config
    }

    pub fn shared(&self) -> &'a SharedState {
        self.shared
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }
}

impl<H: SampleHal, M: Modem> TickHandler for FrontEnd<'_, H, M> {
    #[inline]
    fn on_tick(&mut self) {
        FrontEnd::on_tick(self)
    }
}
