#![allow(missing_docs)]
//! LED re-drive on behavior and manual-state changes, with and without
//! `immediate_led_update`.

use core::cell::Cell;

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_futures::yield_now;
use embassy_time::{Instant, MockDriver};
use touch_led::touch_button::{
    LedBehavior, PinDirection, PinRole, TouchButton, TouchButtonConfig, TouchHardware,
    WiringMode, run_touch_button,
};

static TOUCH_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig {
    wiring_mode: WiringMode::ThreeWire,
    led_behavior: LedBehavior::Manual,
    immediate_led_update: true,
    ..TouchButtonConfig::new()
});
static DEFERRED_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig {
    wiring_mode: WiringMode::ThreeWire,
    led_behavior: LedBehavior::Manual,
    immediate_led_update: false,
    ..TouchButtonConfig::new()
});

/// Untouched pad; remembers the sink level and counts reads.
struct LedHardware<'a> {
    reads: &'a Cell<usize>,
    sink_level: &'a Cell<Option<bool>>,
}

impl TouchHardware for LedHardware<'_> {
    fn read_touch_intensity(&mut self, _pin: PinRole) -> u16 {
        self.reads.set(self.reads.get() + 1);
        100
    }

    fn set_pin_direction(&mut self, _pin: PinRole, _direction: PinDirection) {}

    fn set_pin_level(&mut self, pin: PinRole, high: bool) {
        if pin == PinRole::Sink {
            self.sink_level.set(Some(high));
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

async fn settle() {
    for _ in 0..4 {
        yield_now().await;
    }
}

#[test]
fn led_changes_wait_for_a_sample_unless_immediate() {
    let reads = Cell::new(0);
    let sink_level = Cell::new(None);
    let hardware = LedHardware {
        reads: &reads,
        sink_level: &sink_level,
    };

    let script = async {
        TOUCH_BUTTON.start();
        settle().await;
        assert_eq!(sink_level.get(), None);

        TOUCH_BUTTON.set_manual_led_state(true);
        settle().await;
        assert_eq!(sink_level.get(), Some(true));

        TOUCH_BUTTON.set_led_behavior(LedBehavior::Push);
        settle().await;
        assert_eq!(sink_level.get(), Some(false));

        // No time has passed, so none of that came from a sample.
        assert_eq!(reads.get(), 0);

        MockDriver::get().advance(TOUCH_BUTTON.config().sample_period);
        settle().await;
        assert_eq!(reads.get(), 1);

        TOUCH_BUTTON.stop().await;
    };

    match block_on(select(run_touch_button(&TOUCH_BUTTON, hardware, ()), script)) {
        Either::First(never) => never,
        Either::Second(()) => {}
    }

    // Without the flag, setters leave the pins alone until the next sample.
    reads.set(0);
    sink_level.set(None);
    let hardware = LedHardware {
        reads: &reads,
        sink_level: &sink_level,
    };

    let script = async {
        DEFERRED_BUTTON.start();
        settle().await;

        DEFERRED_BUTTON.set_manual_led_state(true);
        settle().await;
        assert_eq!(sink_level.get(), None);

        DEFERRED_BUTTON.set_led_behavior(LedBehavior::PushInverted);
        settle().await;
        assert_eq!(sink_level.get(), None);
        assert_eq!(reads.get(), 0);

        MockDriver::get().advance(DEFERRED_BUTTON.config().sample_period);
        settle().await;
        assert_eq!(reads.get(), 1);
        assert_eq!(sink_level.get(), Some(true));

        DEFERRED_BUTTON.set_led_behavior(LedBehavior::Push);
        settle().await;
        assert_eq!(sink_level.get(), Some(true));

        DEFERRED_BUTTON.stop().await;
    };

    match block_on(select(run_touch_button(&DEFERRED_BUTTON, hardware, ()), script)) {
        Either::First(never) => never,
        Either::Second(()) => {}
    }
}
