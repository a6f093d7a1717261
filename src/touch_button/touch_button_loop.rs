//! Periodic sampling for a [`TouchButton`].
//!
//! [`run_touch_button`] is the loop; [`TouchButton::start`] and [`TouchButton::stop`]
//! switch it between idle and sampling. On embedded builds,
//! [`TouchButton::spawn`] runs the loop in its own embassy task.

use embassy_futures::select::{Either3, select, select3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker, Timer};
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use super::{TouchButton, TouchEvents, TouchHardware};

// ============================================================================
// LoopControl - Start/stop handshake between callers and the loop
// ============================================================================

type LoopSignal = Signal<CriticalSectionRawMutex, ()>;

// Stop requests are numbered. The loop echoes the latest number it has seen into
// `stops_acked` before it could sample again, and every `stop()` waits for the echo
// to reach its own number. A `start()` landing in between cannot swallow the ack.
pub(crate) struct LoopControl {
    started: AtomicBool,
    attached: AtomicBool,
    stop_requests: AtomicU32,
    stops_acked: AtomicU32,
    wake: LoopSignal,
    stopped: LoopSignal,
    led_refresh: LoopSignal,
}

impl LoopControl {
    pub(crate) const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            attached: AtomicBool::new(false),
            stop_requests: AtomicU32::new(0),
            stops_acked: AtomicU32::new(0),
            wake: Signal::new(),
            stopped: Signal::new(),
            led_refresh: Signal::new(),
        }
    }

    /// Returns `false` if already started.
    pub(crate) fn start(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.wake.signal(());
        true
    }

    /// `recheck` bounds how long a waiter sleeps if another stopper took the
    /// `stopped` wake-up.
    pub(crate) async fn stop(&self, recheck: Duration) {
        if !self.started.swap(false, Ordering::AcqRel) {
            return;
        }
        let request = self.stop_requests.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.wake.signal(());

        while self.attached.load(Ordering::Acquire) && !self.is_acked(request) {
            select(self.stopped.wait(), Timer::after(recheck)).await;
        }
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub(crate) fn request_led_refresh(&self) {
        self.led_refresh.signal(());
    }

    fn is_acked(&self, request: u32) -> bool {
        // Wrapping "acked >= request".
        self.stops_acked.load(Ordering::Acquire).wrapping_sub(request) < u32::MAX / 2
    }

    // Called by the loop whenever it may have missed a stop.
    fn ack_stops(&self) {
        let requested = self.stop_requests.load(Ordering::Acquire);
        if self.stops_acked.swap(requested, Ordering::AcqRel) != requested {
            self.stopped.signal(());
        }
    }

    fn attach(&self) -> Attached<'_> {
        self.attached.store(true, Ordering::Release);
        Attached(self)
    }
}

// Detaches when the loop future is dropped, releasing any `stop()` waiting on it.
struct Attached<'a>(&'a LoopControl);

impl Drop for Attached<'_> {
    fn drop(&mut self) {
        self.0.attached.store(false, Ordering::Release);
        self.0.stopped.signal(());
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Samples `button` every [`sample_period`](super::TouchButtonConfig::sample_period)
/// while it is started.
///
/// The loop idles until [`TouchButton::start`], samples on a fixed-rate ticker, and
/// goes back to idle on [`TouchButton::stop`], acknowledging the stop before any
/// further sample. With
/// [`immediate_led_update`](super::TouchButtonConfig::immediate_led_update), LED
/// changes requested between ticks are driven right away.
///
/// Run exactly one loop per button. Embassy tasks cannot be generic, so wrap this in
/// a task for your hardware and event types:
///
/// ```rust,no_run
/// # #![no_std]
/// # #![no_main]
/// use touch_led::touch_button::{
///     RcTouchHardware, TouchButton, TouchButtonConfig, TouchEventChannel, run_touch_button,
/// };
/// # #[panic_handler]
/// # fn panic(_info: &core::panic::PanicInfo) -> ! { loop {} }
///
/// static TOUCH_BUTTON: TouchButton = TouchButton::new(TouchButtonConfig::new());
/// static TOUCH_EVENTS: TouchEventChannel = TouchEventChannel::new();
///
/// #[embassy_executor::task]
/// async fn my_touch_task(hardware: RcTouchHardware<'static>) -> ! {
///     run_touch_button(&TOUCH_BUTTON, hardware, &TOUCH_EVENTS).await
/// }
/// ```
pub async fn run_touch_button<H, E>(button: &TouchButton, mut hardware: H, mut events: E) -> !
where
    H: TouchHardware,
    E: TouchEvents,
{
    let control = &button.control;
    let _attached = control.attach();
    info!("run_touch_button: loop attached");

    loop {
        while !control.started.load(Ordering::Acquire) {
            control.ack_stops();
            control.wake.wait().await;
        }

        let sample_period = button.config.sample_period;
        info!(
            "run_touch_button: sampling every {} ms",
            sample_period.as_millis()
        );
        let mut ticker = Ticker::every(sample_period);

        loop {
            let woken_by = select3(
                ticker.next(),
                control.wake.wait(),
                control.led_refresh.wait(),
            )
            .await;

            // Also covers a stop followed by a restart before this wake-up.
            control.ack_stops();
            if !control.started.load(Ordering::Acquire) {
                break;
            }

            match woken_by {
                Either3::First(()) => button.sample(&mut hardware, &mut events),
                Either3::Second(()) => {} // start while running
                Either3::Third(()) => button.drive_led(&mut hardware),
            }
        }

        info!("run_touch_button: sampling stopped");
    }
}

// ============================================================================
// Embedded task
// ============================================================================

#[cfg(not(feature = "host"))]
mod embedded {
    use embassy_executor::Spawner;

    use super::run_touch_button;
    use crate::touch_button::{RcTouchHardware, TouchButton, TouchEventChannel};
    use crate::{Error, Result};

    #[embassy_executor::task]
    async fn touch_button_task(
        button: &'static TouchButton,
        hardware: RcTouchHardware<'static>,
        events: &'static TouchEventChannel,
    ) -> ! {
        run_touch_button(button, hardware, events).await
    }

    impl TouchButton {
        /// Spawns the sampling loop for this button on `spawner`.
        ///
        /// The loop stays idle until [`start`](Self::start). Events go to `events`.
        /// Only one button can be spawned this way; for more, wrap
        /// [`run_touch_button`] in tasks of your own.
        ///
        /// See the [struct-level example](Self) for usage.
        ///
        /// # Errors
        ///
        /// Returns [`Error::TaskSpawn`] if the task is already running.
        pub fn spawn(
            &'static self,
            hardware: RcTouchHardware<'static>,
            events: &'static TouchEventChannel,
            spawner: Spawner,
        ) -> Result<()> {
            let token = touch_button_task(self, hardware, events);
            spawner.spawn(token).map_err(Error::TaskSpawn)?;
            info!("TouchButton::spawn: task spawned");
            Ok(())
        }
    }
}
