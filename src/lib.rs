//! # AfskFrontend
//!
//! Fixed-rate analog front-end for a software AFSK modem.
//!
//! ## Architecture
//!
//! One hardware timer ticks at 9600 Hz. Every tick, inside one interrupt:
//! - the converter result is re-biased around zero and handed to the modem
//! - the modem's next output level (or an idle level) goes to the 4-bit DAC
//!   port, together with the PTT line
//!
//! Foreground code only touches [`SharedState`]: the transmit/key flags,
//! tick counters, fault latch and log rings. All of it is atomic.

#![cfg_attr(not(test), no_std)]

pub mod capture;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fault;
pub mod hal;
pub mod log_drain;
pub mod logging;
pub mod modem;
pub mod playback;
pub mod ptt;
pub mod shared;

pub use config::{FrontEndConfig, CONFIG};
pub use dispatcher::FrontEnd;
pub use error::{ConfigError, InitError};
pub use fault::{FaultCode, FaultState};
pub use modem::{Modem, NullModem};
pub use ptt::{TxControl, TxState};
pub use shared::{SharedState, TickStats};
