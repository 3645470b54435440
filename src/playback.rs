//! Playback path
//!
//! Output port layout (one byte, written in a single store):
//!
//! ```text
//!  bit  7 6 5 4 | 3   | 2 1 0
//!       DAC3..0 | PTT | unused
//! ```
//!
//! The 4-bit R-2R ladder on bits 7..4 turns mid-scale (0b1000) into 0 V.

use crate::hal::{HalError, SampleHal};
use crate::modem::Modem;
use crate::ptt::{TxControl, TxState};

/// DAC bits of the output port.
pub const DAC_MASK: u8 = 0xF0;

/// Transmitter key line.
pub const PTT_BIT: u8 = 1 << 3;

/// Every port bit the front-end drives.
pub const OUTPUT_PINS: u8 = DAC_MASK | PTT_BIT;

/// Mid-scale, PTT released.
pub const QUIET_LEVEL: u8 = 0x80;

/// Mid-scale, PTT asserted.
pub const KEYED_IDLE_LEVEL: u8 = QUIET_LEVEL | PTT_BIT;

/// Port value for a modem sample: keep the DAC nibble, assert PTT.
#[inline]
pub const fn modulated_level(sample: u8) -> u8 {
    (sample & DAC_MASK) | PTT_BIT
}

/// Port value while not modulating.
#[inline]
pub const fn idle_level(key: bool) -> u8 {
    if key {
        KEYED_IDLE_LEVEL
    } else {
        QUIET_LEVEL
    }
}

/// Pick the port value for this tick, pulling from the modem only when transmitting.
#[inline]
pub fn select_output<M: Modem + ?Sized>(state: TxState, modem: &mut M) -> u8 {
    match state {
        TxState::Modulating => modulated_level(modem.on_output_request()),
        TxState::KeyedIdle | TxState::Quiet => idle_level(state.ptt_asserted()),
    }
}

/// Set the DAC and PTT pins to outputs, parked at the quiet level.
pub fn configure<H: SampleHal>(hal: &mut H) -> Result<(), HalError> {
    hal.configure_output(OUTPUT_PINS, QUIET_LEVEL)
}

/// Sample the flags once and write the port.
#[inline]
pub fn service<H: SampleHal, M: Modem + ?Sized>(
    tx: &TxControl,
    hal: &mut H,
    modem: &mut M,
) -> TxState {
    let state = tx.state();
    hal.write_output(select_output(state, modem));
    state
}
