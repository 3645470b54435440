//! Boundary with the AFSK modem.
//!
//! The front-end is a fixed-rate transport: one sample in and, while
//! transmitting, one sample out per tick. Tone detection, bit timing and
//! framing all live behind this trait.

/// Per-tick modem operations.
///
/// Both methods are called from the sampling interrupt. Implementations
/// must return promptly and must not block or allocate.
pub trait Modem {
    /// Deliver the re-biased capture value for this tick.
    fn on_input_sample(&mut self, sample: i16);

    /// Produce the next output level. Only the upper four bits reach the DAC.
    fn on_output_request(&mut self) -> u8;
}

impl<M: Modem + ?Sized> Modem for &mut M {
    #[inline]
    fn on_input_sample(&mut self, sample: i16) {
        (**self).on_input_sample(sample)
    }

    #[inline]
    fn on_output_request(&mut self) -> u8 {
        (**self).on_output_request()
    }
}

/// Modem that discards input and always plays the mid-scale level.
///
/// Keeps the front-end running when no demodulator is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullModem {
    samples: u32,
}

impl NullModem {
    pub const fn new() -> Self {
        Self { samples: 0 }
    }

    /// Input samples received so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

impl Modem for NullModem {
    #[inline]
    fn on_input_sample(&mut self, _sample: i16) {
        self.samples = self.samples.wrapping_add(1);
    }

    #[inline]
    fn on_output_request(&mut self) -> u8 {
        0x80
    }
}
