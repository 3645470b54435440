//! ESP32-S3 backend on ESP-IDF.
//!
//! - Sampling clock: GPTimer at 16 MHz resolution, auto-reload alarm
//! - Capture: ADC1 oneshot read inside the alarm callback (the alarm is the trigger)
//! - Playback: dedicated-GPIO bundle, so DAC nibble and PTT change in one write
//!
//! Requires `CONFIG_ADC_ONESHOT_CTRL_FUNC_IN_IRAM=y` (ISR-safe oneshot read),
//! see `sdkconfig.defaults`.

use core::ffi::c_void;
use core::ptr;

use esp_idf_svc::sys;

use super::{HalError, SampleHal, TickHandler};
use crate::capture::AdcChannel;
use crate::config::{ADC_BITS, BASE_CLOCK_HZ};
use crate::playback::OUTPUT_PINS;

/// Native ADC1 resolution on the S3.
const NATIVE_ADC_BITS: u8 = 12;

/// Port bit 3 (PTT) is bundle bit 0; port bits 7..4 (DAC) are bundle bits 4..1.
const PORT_SHIFT: u8 = 3;
const BUNDLE_WIDTH: usize = 5;

/// Output pins.
#[derive(Debug, Clone, Copy)]
pub struct EspPins {
    /// DAC ladder, least significant bit first (port bits 4..7)
    pub dac: [i32; 4],
    /// Transmitter key (port bit 3)
    pub ptt: i32,
}

impl Default for EspPins {
    fn default() -> Self {
        // ADC1 occupies GPIO1..GPIO10; keep the outputs well clear of it.
        Self {
            dac: [38, 39, 40, 41],
            ptt: 42,
        }
    }
}

#[inline]
const fn port_to_bundle(port: u8) -> u32 {
    ((port & OUTPUT_PINS) >> PORT_SHIFT) as u32
}

fn check(err: sys::esp_err_t) -> Result<(), HalError> {
    if err == sys::ESP_OK as sys::esp_err_t {
        Ok(())
    } else {
        Err(HalError::new(err))
    }
}

/// GPTimer + ADC1 + dedicated-GPIO front-end.
pub struct EspFrontEnd {
    pins: EspPins,
    timer: sys::gptimer_handle_t,
    adc: sys::adc_oneshot_unit_handle_t,
    channel: sys::adc_channel_t,
    bundle: sys::dedic_gpio_bundle_handle_t,
    last_raw: u16,
}

impl EspFrontEnd {
    /// No peripheral is claimed until the first `configure_*` call.
    pub fn new(pins: EspPins) -> Self {
        Self {
            pins,
            timer: ptr::null_mut(),
            adc: ptr::null_mut(),
            channel: 0,
            bundle: ptr::null_mut(),
            last_raw: 0,
        }
    }

    /// Timer handle, null before `configure_clock`.
    pub fn timer(&self) -> sys::gptimer_handle_t {
        self.timer
    }

    /// Hook `handler` to the alarm and start ticking.
    ///
    /// # Safety
    ///
    /// `handler` must outlive the timer and, once this returns, must only be
    /// accessed from the alarm callback.
    pub unsafe fn start<T: TickHandler>(
        timer: sys::gptimer_handle_t,
        handler: *mut T,
    ) -> Result<(), HalError> {
        if timer.is_null() {
            return Err(HalError::new(sys::ESP_ERR_INVALID_STATE as sys::esp_err_t));
        }

        let callbacks = sys::gptimer_event_callbacks_t {
            on_alarm: Some(on_alarm::<T>),
        };
        check(sys::gptimer_register_event_callbacks(timer, &callbacks, handler as *mut c_void))?;
        check(sys::gptimer_enable(timer))?;
        check(sys::gptimer_start(timer))
    }
}

unsafe extern "C" fn on_alarm<T: TickHandler>(
    _timer: sys::gptimer_handle_t,
    _event: *const sys::gptimer_alarm_event_data_t,
    ctx: *mut c_void,
) -> bool {
    // SAFETY: ctx is the handler registered in `start`, exclusively ours here.
    let handler = &mut *(ctx as *mut T);
    handler.on_tick();
    // No task woken.
    false
}

impl SampleHal for EspFrontEnd {
    fn configure_clock(&mut self, reload: u16) -> Result<(), HalError> {
        if self.timer.is_null() {
            let config = sys::gptimer_config_t {
                clk_src: sys::soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
                direction: sys::gptimer_count_direction_t_GPTIMER_COUNT_UP,
                resolution_hz: BASE_CLOCK_HZ,
                ..Default::default()
            };
            // SAFETY: config outlives the call, handle written by the driver.
            check(unsafe { sys::gptimer_new_timer(&config, &mut self.timer) })?;
        }

        // The alarm fires when the count reaches alarm_count, then reloads 0:
        // one period is reload + 1 counts, same as a TOP-compare counter.
        let mut alarm = sys::gptimer_alarm_config_t {
            alarm_count: reload as u64 + 1,
            reload_count: 0,
            ..Default::default()
        };
        alarm.flags.set_auto_reload_on_alarm(1);

        // SAFETY: timer handle is valid, alarm outlives the call.
        unsafe {
            check(sys::gptimer_set_alarm_action(self.timer, &alarm))?;
            check(sys::gptimer_set_raw_count(self.timer, 0))
        }
    }

    fn configure_converter(&mut self, channel: AdcChannel) -> Result<(), HalError> {
        if self.adc.is_null() {
            let unit = sys::adc_oneshot_unit_init_cfg_t {
                unit_id: sys::adc_unit_t_ADC_UNIT_1,
                ..Default::default()
            };
            // SAFETY: unit config outlives the call.
            check(unsafe { sys::adc_oneshot_new_unit(&unit, &mut self.adc) })?;
        }

        self.channel = channel.index() as sys::adc_channel_t;
        // Full-scale ~3.1 V against the supply: the bias sits at mid-scale.
        let chan = sys::adc_oneshot_chan_cfg_t {
            atten: sys::adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: sys::adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
        };

        let mut io: i32 = 0;
        // SAFETY: unit handle valid; the driver puts the pad in analog mode,
        // which also removes it from the digital input matrix.
        unsafe {
            check(sys::adc_oneshot_config_channel(self.adc, self.channel, &chan))?;
            check(sys::adc_oneshot_channel_to_io(sys::adc_unit_t_ADC_UNIT_1, self.channel, &mut io))?;
            check(sys::gpio_pullup_dis(io))?;
            check(sys::gpio_pulldown_dis(io))
        }
    }

    fn configure_output(&mut self, pins: u8, level: u8) -> Result<(), HalError> {
        if self.bundle.is_null() {
            let gpios: [i32; BUNDLE_WIDTH] = [
                self.pins.ptt,
                self.pins.dac[0],
                self.pins.dac[1],
                self.pins.dac[2],
                self.pins.dac[3],
            ];
            let mut config = sys::dedic_gpio_bundle_config_t {
                gpio_array: gpios.as_ptr(),
                array_size: BUNDLE_WIDTH,
                ..Default::default()
            };
            config.flags.set_out_en(1);
            // SAFETY: the driver copies the pin list before returning.
            check(unsafe { sys::dedic_gpio_new_bundle(&config, &mut self.bundle) })?;
        }

        // SAFETY: bundle handle valid.
        unsafe {
            sys::dedic_gpio_bundle_write(self.bundle, port_to_bundle(pins), port_to_bundle(level));
        }
        Ok(())
    }

    #[inline]
    fn acknowledge_tick(&mut self) {
        // The GPTimer driver clears the alarm status before calling us.
    }

    #[inline]
    fn read_input(&mut self) -> u16 {
        let mut raw: i32 = 0;
        // SAFETY: IRAM-safe with CONFIG_ADC_ONESHOT_CTRL_FUNC_IN_IRAM.
        let err = unsafe { sys::adc_oneshot_read(self.adc, self.channel, &mut raw) };
        if err == sys::ESP_OK as sys::esp_err_t {
            self.last_raw = (raw as u16) >> (NATIVE_ADC_BITS - ADC_BITS);
        }
        self.last_raw
    }

    #[inline]
    fn write_output(&mut self, value: u8) {
        // SAFETY: bundle handle valid; dedic_gpio writes are ISR-safe.
        unsafe {
            sys::dedic_gpio_bundle_write(self.bundle, port_to_bundle(OUTPUT_PINS), port_to_bundle(value));
        }
    }
}
