#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};
use defmt::info;
use embassy_executor::Spawner;
use touch_led::{
    Result,
    touch_button::{
        LedBehavior, RcTouchHardware, TouchButton, TouchButtonConfig, TouchEvent,
        TouchEventChannel, WiringMode,
    },
};
use {defmt_rtt as _, panic_probe as _};

// Pad on GPIO 14 (1 MΩ pull-up to 3.3V), LED between GPIO 14 and GPIO 15.
// The default 30/35 thresholds match RcTouchHardware's 100 µs scale.
static TOUCH_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig {
    wiring_mode: WiringMode::TwoWire,
    led_behavior: LedBehavior::Toggle,
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

    // The button samples and drives its own LED in a background task.
    let hardware = RcTouchHardware::new(p.PIN_14, p.PIN_15);
    TOUCH_BUTTON.spawn(hardware, &TOUCH_EVENTS, spawner)?;
    TOUCH_BUTTON.start();

    loop {
        match TOUCH_EVENTS.receive().await {
            TouchEvent::Toggled(on) => info!("LED is now {}", if on { "on" } else { "off" }),
            TouchEvent::Pressed => info!(
                "pressed (intensity {})",
                TOUCH_BUTTON.last_sample_intensity()
            ),
            TouchEvent::Released | TouchEvent::LongPressed => {}
        }
    }
}
