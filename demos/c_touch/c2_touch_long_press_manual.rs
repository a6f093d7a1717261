#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};
use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use touch_led::{
    Result,
    touch_button::{
        LedBehavior, RcTouchHardware, TouchButton, TouchButtonConfig, TouchEvent,
        TouchEventChannel, WiringMode,
    },
};
use {defmt_rtt as _, panic_probe as _};

// Pad on GPIO 14 (1 MΩ pull-up to 3.3V), LED from GPIO 15 to ground.
// The default 30/35 thresholds match RcTouchHardware's 100 µs scale.
static TOUCH_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig {
    wiring_mode: WiringMode::ThreeWire,
    long_press_duration: Duration::from_millis(1500),
    immediate_led_update: true,
    ..TouchButtonConfig::new()
});
static TOUCH_EVENTS: TouchEventChannel = TouchEventChannel::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let hardware = RcTouchHardware::new(p.PIN_14, p.PIN_15);
    TOUCH_BUTTON.spawn(hardware, &TOUCH_EVENTS, spawner)?;
    TOUCH_BUTTON.start();

    // The LED follows the finger until a long press hands it to the application,
    // which blinks it three times and gives it back.
    loop {
        if TOUCH_EVENTS.receive().await != TouchEvent::LongPressed {
            continue;
        }
        info!("long press: blinking");

        TOUCH_BUTTON.set_led_behavior(LedBehavior::Manual);
        for _ in 0..3 {
            TOUCH_BUTTON.set_manual_led_state(true);
            Timer::after_millis(200).await;
            TOUCH_BUTTON.set_manual_led_state(false);
            Timer::after_millis(200).await;
        }

        // Sampling pauses while the LED settles, so presses in this window are ignored.
        TOUCH_BUTTON.stop().await;
        TOUCH_EVENTS.clear();
        TOUCH_BUTTON.set_led_behavior(LedBehavior::Push);
        TOUCH_BUTTON.start();
    }
}
