//! The narrow hardware interface a [`TouchButton`](super::TouchButton) samples and drives through.

use embassy_time::Instant;

/// Which of the button's two pins an operation addresses.
///
/// Adapters own the physical pins; the state machine only ever names them by role.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum PinRole {
    /// The pin wired to the touch pad. In [`WiringMode::TwoWire`](super::WiringMode::TwoWire)
    /// it also drives the LED between samples.
    Touch,
    /// The LED's second pin. A ground reference in two-wire mode, the LED drive in
    /// three-wire mode.
    Sink,
}

/// Direction a pin is configured for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum PinDirection {
    /// High impedance input.
    Input,
    /// Push-pull output.
    Output,
}

/// Pin and clock access used by [`TouchButton::sample`](super::TouchButton::sample).
///
/// Every method must return promptly; `sample` is called from a periodic task and
/// never expects to block.
pub trait TouchHardware {
    /// Reads the raw touch intensity of `pin`. Lower values mean stronger touch.
    fn read_touch_intensity(&mut self, pin: PinRole) -> u16;

    /// Configures `pin` as an input or an output.
    fn set_pin_direction(&mut self, pin: PinRole, direction: PinDirection);

    /// Drives `pin` high (`true`) or low (`false`). Only meaningful for outputs.
    fn set_pin_level(&mut self, pin: PinRole, high: bool);

    /// Monotonic time used for long-press timing.
    fn now(&self) -> Instant;
}

impl<H: TouchHardware + ?Sized> TouchHardware for &mut H {
    fn read_touch_intensity(&mut self, pin: PinRole) -> u16 {
        (**self).read_touch_intensity(pin)
    }

    fn set_pin_direction(&mut self, pin: PinRole, direction: PinDirection) {
        (**self).set_pin_direction(pin, direction);
    }

    fn set_pin_level(&mut self, pin: PinRole, high: bool) {
        (**self).set_pin_level(pin, high);
    }

    fn now(&self) -> Instant {
        (**self).now()
    }
}
