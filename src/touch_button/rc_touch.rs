//! Touch sensing on a plain Pico GPIO by timing how long the pad takes to charge.
//!
//! The RP2040 and RP2350 have no touch peripheral, so [`RcTouchHardware`] measures
//! capacitance directly: it drains the pad, lets it float, and counts microseconds
//! until the pin reads high. A finger adds capacitance and slows the charge.
//!
//! # Hardware Requirements
//!
//! Pull the touch pin up to 3.3V through a 1 MΩ resistor. Smaller resistors charge
//! too fast to tell touched from untouched.
//!
//! # Calibration
//!
//! Intensity is [`DEFAULT_MAX_CHARGE_US`] minus the charge time, floored at zero.
//! With 1 MΩ an untouched pad charges in roughly 5 to 20 µs (intensity 80 to 95)
//! and a touched pad takes 100 µs or more (intensity 0). The default thresholds of
//! [`TouchButtonConfig`](super::TouchButtonConfig) then press above 70 µs and release
//! below 65 µs. Log
//! [`TouchButton::last_sample_intensity`](super::TouchButton::last_sample_intensity)
//! to check a pad; for a larger resistor raise the ceiling with
//! [`RcTouchHardware::with_max_charge_us`] and scale the thresholds with it.

#[cfg(not(feature = "host"))]
use embassy_rp::Peri;
#[cfg(not(feature = "host"))]
use embassy_rp::gpio::{Flex, Level, Pin, Pull};
#[cfg(not(feature = "host"))]
use embassy_time::{Duration, Instant, block_for};

#[cfg(not(feature = "host"))]
use super::{PinDirection, PinRole, TouchHardware};

/// Longest charge time measured, in microseconds. Also the intensity of an untouched,
/// instantly charging pad.
pub const DEFAULT_MAX_CHARGE_US: u16 = 100;

/// Time the pad is held low to drain it before each measurement.
#[cfg(not(feature = "host"))]
const DISCHARGE_TIME: Duration = Duration::from_micros(10);

/// Intensity reported for a pad that took `charge_us` to read high.
///
/// Slower charge (a finger on the pad) gives a lower value, down to zero at
/// `max_charge_us`.
#[must_use]
pub const fn charge_time_intensity(charge_us: u16, max_charge_us: u16) -> u16 {
    max_charge_us.saturating_sub(charge_us)
}

/// [`TouchHardware`] for a Pico using charge-time sensing on the touch pin.
///
/// Intensity comes from [`charge_time_intensity`], so a touched pad (slow charge)
/// reads low. See the [module documentation](self#calibration) for the scale.
#[cfg(not(feature = "host"))]
pub struct RcTouchHardware<'d> {
    touch: Flex<'d>,
    sink: Flex<'d>,
    max_charge_us: u16,
}

#[cfg(not(feature = "host"))]
impl<'d> RcTouchHardware<'d> {
    /// Creates the adapter from the touch pin and the LED sink pin.
    #[must_use]
    pub fn new(touch_pin: Peri<'d, impl Pin>, sink_pin: Peri<'d, impl Pin>) -> Self {
        Self::with_max_charge_us(touch_pin, sink_pin, DEFAULT_MAX_CHARGE_US)
    }

    /// Like [`new`](Self::new) with a custom measurement ceiling.
    #[must_use]
    pub fn with_max_charge_us(
        touch_pin: Peri<'d, impl Pin>,
        sink_pin: Peri<'d, impl Pin>,
        max_charge_us: u16,
    ) -> Self {
        let mut touch = Flex::new(touch_pin);
        touch.set_pull(Pull::None);
        let sink = Flex::new(sink_pin);
        Self {
            touch,
            sink,
            max_charge_us,
        }
    }

    fn pin(&mut self, pin: PinRole) -> &mut Flex<'d> {
        match pin {
            PinRole::Touch => &mut self.touch,
            PinRole::Sink => &mut self.sink,
        }
    }
}

#[cfg(not(feature = "host"))]
impl TouchHardware for RcTouchHardware<'_> {
    fn read_touch_intensity(&mut self, pin: PinRole) -> u16 {
        let max_charge_us = self.max_charge_us;
        let flex = self.pin(pin);

        flex.set_low();
        flex.set_as_output();
        block_for(DISCHARGE_TIME);
        flex.set_as_input();

        let start = Instant::now();
        let mut charge_us = 0_u16;
        while flex.is_low() && charge_us < max_charge_us {
            charge_us = u16::try_from(start.elapsed().as_micros()).unwrap_or(u16::MAX);
        }
        charge_time_intensity(charge_us, max_charge_us)
    }

    fn set_pin_direction(&mut self, pin: PinRole, direction: PinDirection) {
        let flex = self.pin(pin);
        match direction {
            PinDirection::Input => flex.set_as_input(),
            PinDirection::Output => flex.set_as_output(),
        }
    }

    fn set_pin_level(&mut self, pin: PinRole, high: bool) {
        self.pin(pin).set_level(Level::from(high));
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch_button::DEFAULT_TOUCH_BUTTON_CONFIG;

    #[test]
    fn default_thresholds_separate_touched_from_untouched_pads() {
        let config = DEFAULT_TOUCH_BUTTON_CONFIG;

        // Untouched pads on 1 MΩ charge within a few tens of microseconds.
        for charge_us in [0, 5, 20, 60] {
            let intensity = charge_time_intensity(charge_us, DEFAULT_MAX_CHARGE_US);
            assert!(intensity > config.threshold_off, "{charge_us} µs read {intensity}");
        }

        // A finger pushes the charge past 70 µs, up to the ceiling.
        for charge_us in [71, 100, 250, u16::MAX] {
            let intensity = charge_time_intensity(charge_us, DEFAULT_MAX_CHARGE_US);
            assert!(intensity < config.threshold_on, "{charge_us} µs read {intensity}");
        }
    }

    #[test]
    fn intensity_is_clamped_at_zero() {
        assert_eq!(charge_time_intensity(100, 100), 0);
        assert_eq!(charge_time_intensity(3_000, 100), 0);
        assert_eq!(charge_time_intensity(40, 100), 60);
    }
}
