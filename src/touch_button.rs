//! A device abstraction for a capacitive touch button with LED feedback.
//!
//! The button samples a touch pad at a fixed period, turns the raw intensity into a
//! stable pressed/released state with two thresholds, detects long presses, and
//! lights an LED according to a [`LedBehavior`].
//!
//! See [`TouchButton`] for the full usage example.
//!
//! # Wiring
//!
//! - [`WiringMode::TwoWire`]: pad and LED share the touch pin. The LED sits between the
//!   touch pin and the sink pin. The touch pin is an input while sensing and drives the
//!   LED the rest of the time; the sink pin is held low as the LED's ground.
//! - [`WiringMode::ThreeWire`]: the touch pin only goes to the pad. The LED sits between
//!   the sink pin and ground and the sink pin drives it.

use core::convert::Infallible;

use embassy_time::{Duration, Instant};
use portable_atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU64, Ordering};

use crate::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

pub mod events;
pub mod hardware;
pub mod rc_touch;
mod touch_button_loop;

pub use events::{
    TOUCH_EVENT_CAPACITY, TouchCallbacks, TouchEvent, TouchEventChannel, TouchEvents,
};
pub use hardware::{PinDirection, PinRole, TouchHardware};
#[cfg(not(feature = "host"))]
pub use rc_touch::RcTouchHardware;
pub use touch_button_loop::run_touch_button;

use touch_button_loop::LoopControl;

// ============================================================================
// Constants
// ============================================================================

/// Intensity below which a released button becomes pressed.
pub const DEFAULT_THRESHOLD_ON: u16 = 30;

/// Intensity above which a pressed button becomes released.
pub const DEFAULT_THRESHOLD_OFF: u16 = 35;

/// Time between samples.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(100);

/// How long a press must last to count as a long press.
pub const DEFAULT_LONG_PRESS_DURATION: Duration = Duration::from_millis(3000);

// ============================================================================
// LedBehavior - What the LED shows
// ============================================================================

/// How the LED follows the button.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum LedBehavior {
    /// Lit while pressed.
    #[default]
    Push,
    /// Lit while released.
    PushInverted,
    /// Flips on every press.
    Toggle,
    /// Shows whatever [`TouchButton::set_manual_led_state`] last set.
    Manual,
}

impl LedBehavior {
    const fn to_bits(self) -> u8 {
        match self {
            Self::Push => 0,
            Self::PushInverted => 1,
            Self::Toggle => 2,
            Self::Manual => 3,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::PushInverted,
            2 => Self::Toggle,
            3 => Self::Manual,
            _ => Self::Push,
        }
    }
}

// ============================================================================
// WiringMode - How pad and LED share pins
// ============================================================================

/// Whether the touch pin is time-shared with the LED.
///
/// See the [module documentation](self#wiring) for both circuits.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, defmt::Format)]
pub enum WiringMode {
    /// Touch pin senses and drives the LED; sink pin is the LED's ground.
    #[default]
    TwoWire,
    /// Touch pin only senses; sink pin drives the LED.
    ThreeWire,
}

// ============================================================================
// TouchButtonConfig
// ============================================================================

/// Construction-time settings for a [`TouchButton`].
///
/// Start from [`TouchButtonConfig::new`] (or [`DEFAULT_TOUCH_BUTTON_CONFIG`]) and
/// override fields with struct update syntax; this works in `static` initializers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, defmt::Format)]
pub struct TouchButtonConfig {
    /// A released button becomes pressed when intensity drops strictly below this.
    pub threshold_on: u16,
    /// A pressed button becomes released when intensity rises strictly above this.
    /// Must be greater than `threshold_on`.
    pub threshold_off: u16,
    /// Time between samples. Must be non-zero.
    pub sample_period: Duration,
    /// How long a press lasts before it counts as a long press.
    pub long_press_duration: Duration,
    /// Flip the driven LED level, for LEDs soldered the other way around.
    pub invert_output: bool,
    /// How the pad and LED are wired.
    pub wiring_mode: WiringMode,
    /// LED behavior at construction. Change later with [`TouchButton::set_led_behavior`].
    pub led_behavior: LedBehavior,
    /// Re-drive the LED as soon as [`TouchButton::set_led_behavior`] or
    /// [`TouchButton::set_manual_led_state`] is called, instead of at the next sample.
    /// Requires the button to be running in [`run_touch_button`].
    pub immediate_led_update: bool,
}

/// The default configuration: thresholds 30/35, 100 ms period, 3 s long press,
/// two-wire, push behavior.
pub const DEFAULT_TOUCH_BUTTON_CONFIG: TouchButtonConfig = TouchButtonConfig::new();

impl TouchButtonConfig {
    /// Returns the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold_on: DEFAULT_THRESHOLD_ON,
            threshold_off: DEFAULT_THRESHOLD_OFF,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            long_press_duration: DEFAULT_LONG_PRESS_DURATION,
            invert_output: false,
            wiring_mode: WiringMode::TwoWire,
            led_behavior: LedBehavior::Push,
            immediate_led_update: false,
        }
    }

    /// Checks the thresholds and sample period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ThresholdsNotOrdered`] unless `threshold_on < threshold_off`,
    /// and [`Error::ZeroSamplePeriod`] for a zero `sample_period`.
    pub const fn validate(&self) -> Result<()> {
        if self.threshold_on >= self.threshold_off {
            return Err(Error::ThresholdsNotOrdered {
                threshold_on: self.threshold_on,
                threshold_off: self.threshold_off,
            });
        }
        if self.sample_period.as_ticks() == 0 {
            return Err(Error::ZeroSamplePeriod);
        }
        Ok(())
    }
}

impl Default for TouchButtonConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// LED policy
// ============================================================================

/// The level driven onto the LED for a given state.
///
/// `behavior` picks the source, then `invert_output` flips it. Wiring mode plays no part.
#[must_use]
pub const fn led_output(
    behavior: LedBehavior,
    pressed: bool,
    toggled_on: bool,
    manual_led_state: bool,
    invert_output: bool,
) -> bool {
    let lit = match behavior {
        LedBehavior::Push => pressed,
        LedBehavior::PushInverted => !pressed,
        LedBehavior::Toggle => toggled_on,
        LedBehavior::Manual => manual_led_state,
    };
    lit != invert_output
}

// ============================================================================
// TouchButton
// ============================================================================

/// A capacitive touch button with hysteresis, long-press detection and LED feedback.
///
/// All runtime state lives in atomics, so a `TouchButton` is shared by reference
/// (typically from a `static`) between the task that calls [`sample`](Self::sample)
/// and any code that queries or configures it.
///
/// # Example
///
/// ```rust,no_run
/// # #![no_std]
/// # #![no_main]
/// use touch_led::touch_button::{
///     LedBehavior, RcTouchHardware, TouchButton, TouchButtonConfig, TouchEvent,
///     TouchEventChannel,
/// };
/// # #[panic_handler]
/// # fn panic(_info: &core::panic::PanicInfo) -> ! { loop {} }
///
/// static TOUCH_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig {
///     led_behavior: LedBehavior::Toggle,
///     ..TouchButtonConfig::new()
/// });
/// static TOUCH_EVENTS: TouchEventChannel = TouchEventChannel::new();
///
/// async fn example(
///     p: embassy_rp::Peripherals,
///     spawner: embassy_executor::Spawner,
/// ) -> touch_led::Result<()> {
///     let hardware = RcTouchHardware::new(p.PIN_14, p.PIN_15);
///     TOUCH_BUTTON.spawn(hardware, &TOUCH_EVENTS, spawner)?;
///     TOUCH_BUTTON.start();
///
///     loop {
///         if let TouchEvent::LongPressed = TOUCH_EVENTS.receive().await {
///             // Hand the LED over to the application.
///             TOUCH_BUTTON.set_led_behavior(LedBehavior::Manual);
///             TOUCH_BUTTON.set_manual_led_state(true);
///         }
///     }
/// }
/// ```
pub struct TouchButton {
    config: TouchButtonConfig,
    last_sample_intensity: AtomicU16,
    pressed: AtomicBool,
    toggled_on: AtomicBool,
    long_pressed: AtomicBool,
    long_press_event_sent: AtomicBool,
    press_start_ticks: AtomicU64,
    led_behavior: AtomicU8,
    manual_led_state: AtomicBool,
    control: LoopControl,
}

impl TouchButton {
    /// Creates a released, untoggled button.
    ///
    /// Usable in `static` initializers, where an invalid configuration fails to compile.
    ///
    /// # Panics
    ///
    /// Panics unless `config.threshold_on < config.threshold_off` and
    /// `config.sample_period` is non-zero. Use [`try_new`](Self::try_new) to get an
    /// error instead.
    #[must_use]
    pub const fn new(config: TouchButtonConfig) -> Self {
        assert!(
            config.threshold_on < config.threshold_off,
            "threshold_on must be below threshold_off"
        );
        assert!(
            config.sample_period.as_ticks() > 0,
            "sample_period must be greater than zero"
        );
        Self::init(config)
    }

    /// Creates a released, untoggled button after validating `config`.
    ///
    /// # Errors
    ///
    /// See [`TouchButtonConfig::validate`].
    pub fn try_new(config: TouchButtonConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::init(config))
    }

    const fn init(config: TouchButtonConfig) -> Self {
        Self {
            last_sample_intensity: AtomicU16::new(config.threshold_off),
            pressed: AtomicBool::new(false),
            toggled_on: AtomicBool::new(false),
            long_pressed: AtomicBool::new(false),
            long_press_event_sent: AtomicBool::new(false),
            press_start_ticks: AtomicU64::new(0),
            led_behavior: AtomicU8::new(config.led_behavior.to_bits()),
            manual_led_state: AtomicBool::new(false),
            control: LoopControl::new(),
            config,
        }
    }

    /// Runs one sampling step.
    ///
    /// Reads the pad, drives the LED from the state as it was *before* this step
    /// (so the LED trails the button by one sample), then applies the press, release
    /// and long-press transitions in that order. Events fire synchronously: on press
    /// `on_pressed` then `on_toggled`, on release `on_released`, and `on_long_pressed`
    /// once per press.
    ///
    /// Call this from one task only, roughly every
    /// [`sample_period`](TouchButtonConfig::sample_period).
    /// [`run_touch_button`] does this for you.
    pub fn sample<H, E>(&self, hardware: &mut H, events: &mut E)
    where
        H: TouchHardware + ?Sized,
        E: TouchEvents + ?Sized,
    {
        let intensity = self.sense(hardware);
        self.last_sample_intensity.store(intensity, Ordering::Release);
        trace!("TouchButton: intensity {}", intensity);

        self.drive_led(hardware);

        let now = hardware.now();
        let config = &self.config;

        if !self.is_pressed() && intensity < config.threshold_on {
            let toggled_on = !self.toggled_on.fetch_xor(true, Ordering::AcqRel);
            self.press_start_ticks.store(now.as_ticks(), Ordering::Release);
            self.pressed.store(true, Ordering::Release);
            debug!(
                "TouchButton: pressed (intensity {}, toggled {})",
                intensity, toggled_on
            );
            events.on_pressed();
            events.on_toggled(toggled_on);
        }

        if self.is_pressed() && intensity > config.threshold_off {
            self.long_pressed.store(false, Ordering::Release);
            self.long_press_event_sent.store(false, Ordering::Release);
            self.pressed.store(false, Ordering::Release);
            debug!("TouchButton: released (intensity {})", intensity);
            events.on_released();
        }

        if self.is_pressed() && self.held_for(now) >= config.long_press_duration {
            self.long_pressed.store(true, Ordering::Release);
            if !self.long_press_event_sent.swap(true, Ordering::AcqRel) {
                debug!("TouchButton: long press");
                events.on_long_pressed();
            }
        }
    }

    /// Drives the LED to [`compute_led_output`](Self::compute_led_output) without sampling.
    ///
    /// [`sample`](Self::sample) already does this every period. Call it directly only
    /// from the task that owns the hardware, for example to show a
    /// [`set_manual_led_state`](Self::set_manual_led_state) change right away.
    pub fn drive_led<H: TouchHardware + ?Sized>(&self, hardware: &mut H) {
        let level = self.compute_led_output();
        match self.config.wiring_mode {
            WiringMode::TwoWire => {
                hardware.set_pin_direction(PinRole::Sink, PinDirection::Output);
                hardware.set_pin_level(PinRole::Sink, false);
                hardware.set_pin_direction(PinRole::Touch, PinDirection::Output);
                hardware.set_pin_level(PinRole::Touch, level);
            }
            WiringMode::ThreeWire => {
                hardware.set_pin_direction(PinRole::Sink, PinDirection::Output);
                hardware.set_pin_level(PinRole::Sink, level);
            }
        }
    }

    /// The level the LED should show right now (after `invert_output`).
    #[must_use]
    pub fn compute_led_output(&self) -> bool {
        led_output(
            self.led_behavior(),
            self.is_pressed(),
            self.is_toggled_on(),
            self.manual_led_state(),
            self.config.invert_output,
        )
    }

    /// Whether the button is currently pressed.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }

    /// The toggle state, flipped on every press.
    #[must_use]
    pub fn is_toggled_on(&self) -> bool {
        self.toggled_on.load(Ordering::Acquire)
    }

    /// Whether the current press has lasted the long-press duration.
    #[must_use]
    pub fn is_long_pressed(&self) -> bool {
        self.long_pressed.load(Ordering::Acquire)
    }

    /// The most recent raw intensity reading.
    #[must_use]
    pub fn last_sample_intensity(&self) -> u16 {
        self.last_sample_intensity.load(Ordering::Acquire)
    }

    /// The current LED behavior.
    #[must_use]
    pub fn led_behavior(&self) -> LedBehavior {
        LedBehavior::from_bits(self.led_behavior.load(Ordering::Acquire))
    }

    /// The LED state used by [`LedBehavior::Manual`].
    #[must_use]
    pub fn manual_led_state(&self) -> bool {
        self.manual_led_state.load(Ordering::Acquire)
    }

    /// The configuration this button was built with.
    #[must_use]
    pub const fn config(&self) -> &TouchButtonConfig {
        &self.config
    }

    /// Changes what the LED shows, starting with the next sample (or immediately with
    /// [`immediate_led_update`](TouchButtonConfig::immediate_led_update)).
    pub fn set_led_behavior(&self, behavior: LedBehavior) {
        self.led_behavior.store(behavior.to_bits(), Ordering::Release);
        self.request_led_refresh();
    }

    /// Sets the LED state shown under [`LedBehavior::Manual`]. Ignored by other behaviors.
    pub fn set_manual_led_state(&self, on: bool) {
        self.manual_led_state.store(on, Ordering::Release);
        self.request_led_refresh();
    }

    /// Starts periodic sampling in the attached [`run_touch_button`] loop.
    ///
    /// Calling `start` on a started button does nothing.
    pub fn start(&self) {
        if self.control.start() {
            info!("TouchButton: start requested");
        } else {
            debug!("TouchButton: already started");
        }
    }

    /// Stops periodic sampling.
    ///
    /// Once this returns, the loop makes no further [`sample`](Self::sample) call until
    /// the next [`start`](Self::start). Stopping a stopped button returns immediately.
    pub async fn stop(&self) {
        self.control.stop(self.config.sample_period).await;
    }

    /// Whether [`start`](Self::start) has been called without a later [`stop`](Self::stop).
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.control.is_started()
    }

    fn sense<H: TouchHardware + ?Sized>(&self, hardware: &mut H) -> u16 {
        match self.config.wiring_mode {
            WiringMode::TwoWire => {
                // The LED must not load the pad while sensing.
                hardware.set_pin_direction(PinRole::Sink, PinDirection::Input);
                hardware.set_pin_direction(PinRole::Touch, PinDirection::Input);
                hardware.read_touch_intensity(PinRole::Touch)
            }
            WiringMode::ThreeWire => hardware.read_touch_intensity(PinRole::Touch),
        }
    }

    fn held_for(&self, now: Instant) -> Duration {
        let press_start = Instant::from_ticks(self.press_start_ticks.load(Ordering::Acquire));
        now.saturating_duration_since(press_start)
    }

    fn request_led_refresh(&self) {
        if self.config.immediate_led_update {
            self.control.request_led_refresh();
        }
    }
}

// Lets the debounced state stand in wherever a digital input is expected.
impl embedded_hal::digital::ErrorType for &TouchButton {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for &TouchButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.is_pressed())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.is_pressed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEHAVIORS: [LedBehavior; 4] = [
        LedBehavior::Push,
        LedBehavior::PushInverted,
        LedBehavior::Toggle,
        LedBehavior::Manual,
    ];

    #[test]
    fn led_output_follows_behavior_table_then_inversion() {
        for behavior in BEHAVIORS {
            for bits in 0..16_u8 {
                let pressed = bits & 1 != 0;
                let toggled_on = bits & 2 != 0;
                let manual = bits & 4 != 0;
                let invert = bits & 8 != 0;

                let expected = match behavior {
                    LedBehavior::Push => pressed,
                    LedBehavior::PushInverted => !pressed,
                    LedBehavior::Toggle => toggled_on,
                    LedBehavior::Manual => manual,
                } ^ invert;

                assert_eq!(
                    led_output(behavior, pressed, toggled_on, manual, invert),
                    expected,
                    "{behavior:?} pressed={pressed} toggled={toggled_on} manual={manual} invert={invert}"
                );
            }
        }
    }

    #[test]
    fn led_behavior_survives_atomic_storage() {
        let button = TouchButton::new(TouchButtonConfig::new());
        for behavior in BEHAVIORS {
            button.set_led_behavior(behavior);
            assert_eq!(button.led_behavior(), behavior);
        }
    }

    #[test]
    fn config_validation_rejects_inverted_thresholds() {
        let config = TouchButtonConfig {
            threshold_on: 40,
            threshold_off: 40,
            ..TouchButtonConfig::new()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::ThresholdsNotOrdered {
                threshold_on: 40,
                threshold_off: 40
            })
        ));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(DEFAULT_TOUCH_BUTTON_CONFIG.validate().is_ok());
        assert_eq!(TouchButtonConfig::default(), DEFAULT_TOUCH_BUTTON_CONFIG);
    }
}
