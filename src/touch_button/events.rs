//! Event notifications fired from inside [`TouchButton::sample`](super::TouchButton::sample).
//!
//! Anything implementing [`TouchEvents`] can receive them:
//!
//! - `()` ignores every event.
//! - [`TouchCallbacks`] holds one optional closure per event.
//! - `&TouchEventChannel` queues [`TouchEvent`]s for an async consumer.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;

/// Number of events [`TouchEventChannel`] buffers before dropping new ones.
pub const TOUCH_EVENT_CAPACITY: usize = 8;

/// A single notification from the touch button.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, defmt::Format)]
pub enum TouchEvent {
    /// The button went from released to pressed.
    Pressed,
    /// The button went from pressed to released.
    Released,
    /// The toggle state flipped on a press. Carries the new toggle value.
    Toggled(bool),
    /// The current press has lasted the long-press duration. Sent once per press.
    LongPressed,
}

/// Channel that [`TouchButton::spawn`](super::TouchButton::spawn) and
/// [`run_touch_button`](super::run_touch_button) can deliver events into.
pub type TouchEventChannel = Channel<CriticalSectionRawMutex, TouchEvent, TOUCH_EVENT_CAPACITY>;

/// Receiver of touch button events.
///
/// All methods default to doing nothing, so implementors override only what they need.
/// Methods run synchronously inside `sample()`; keep them short.
pub trait TouchEvents {
    /// The button was pressed. Always followed by [`on_toggled`](Self::on_toggled).
    fn on_pressed(&mut self) {}

    /// The button was released.
    fn on_released(&mut self) {}

    /// The toggle state flipped; `toggled_on` is the new value.
    fn on_toggled(&mut self, _toggled_on: bool) {}

    /// The current press reached the long-press duration.
    fn on_long_pressed(&mut self) {}
}

impl TouchEvents for () {}

impl<E: TouchEvents + ?Sized> TouchEvents for &mut E {
    fn on_pressed(&mut self) {
        (**self).on_pressed();
    }

    fn on_released(&mut self) {
        (**self).on_released();
    }

    fn on_toggled(&mut self, toggled_on: bool) {
        (**self).on_toggled(toggled_on);
    }

    fn on_long_pressed(&mut self) {
        (**self).on_long_pressed();
    }
}

impl<M: RawMutex, const N: usize> TouchEvents for &Channel<M, TouchEvent, N> {
    fn on_pressed(&mut self) {
        send_or_drop(self, TouchEvent::Pressed);
    }

    fn on_released(&mut self) {
        send_or_drop(self, TouchEvent::Released);
    }

    fn on_toggled(&mut self, toggled_on: bool) {
        send_or_drop(self, TouchEvent::Toggled(toggled_on));
    }

    fn on_long_pressed(&mut self) {
        send_or_drop(self, TouchEvent::LongPressed);
    }
}

// The sampling task must never wait on a slow consumer.
fn send_or_drop<M: RawMutex, const N: usize>(
    channel: &Channel<M, TouchEvent, N>,
    event: TouchEvent,
) {
    if channel.try_send(event).is_err() {
        warn!("TouchButton: event channel full, dropping {}", event);
    }
}

/// One optional closure per event.
///
/// Registering a callback replaces the previous one; registering `None` removes it.
///
/// ```rust
/// use core::cell::Cell;
/// use touch_led::touch_button::{TouchCallbacks, TouchEvents};
///
/// let presses = Cell::new(0);
/// let mut count_press = || presses.set(presses.get() + 1);
///
/// let mut callbacks = TouchCallbacks::new();
/// callbacks.set_on_pressed(Some(&mut count_press));
/// callbacks.on_pressed();
/// assert_eq!(presses.get(), 1);
/// ```
#[derive(Default)]
pub struct TouchCallbacks<'a> {
    pressed: Option<&'a mut dyn FnMut()>,
    released: Option<&'a mut dyn FnMut()>,
    toggled: Option<&'a mut dyn FnMut(bool)>,
    long_pressed: Option<&'a mut dyn FnMut()>,
}

impl<'a> TouchCallbacks<'a> {
    /// Creates a set with no callbacks registered.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: None,
            released: None,
            toggled: None,
            long_pressed: None,
        }
    }

    /// Sets (or clears) the callback run on press.
    pub fn set_on_pressed(&mut self, callback: Option<&'a mut dyn FnMut()>) -> &mut Self {
        self.pressed = callback;
        self
    }

    /// Sets (or clears) the callback run on release.
    pub fn set_on_released(&mut self, callback: Option<&'a mut dyn FnMut()>) -> &mut Self {
        self.released = callback;
        self
    }

    /// Sets (or clears) the callback run when the toggle state flips.
    pub fn set_on_toggled(&mut self, callback: Option<&'a mut dyn FnMut(bool)>) -> &mut Self {
        self.toggled = callback;
        self
    }

    /// Sets (or clears) the callback run once per long press.
    pub fn set_on_long_pressed(&mut self, callback: Option<&'a mut dyn FnMut()>) -> &mut Self {
        self.long_pressed = callback;
        self
    }
}

impl TouchEvents for TouchCallbacks<'_> {
    fn on_pressed(&mut self) {
        if let Some(callback) = self.pressed.as_deref_mut() {
            callback();
        }
    }

    fn on_released(&mut self) {
        if let Some(callback) = self.released.as_deref_mut() {
            callback();
        }
    }

    fn on_toggled(&mut self, toggled_on: bool) {
        if let Some(callback) = self.toggled.as_deref_mut() {
            callback(toggled_on);
        }
    }

    fn on_long_pressed(&mut self) {
        if let Some(callback) = self.long_pressed.as_deref_mut() {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_channel_drops_newest_events() {
        let channel: TouchEventChannel = Channel::new();
        let mut sink = &channel;

        for _ in 0..TOUCH_EVENT_CAPACITY {
            sink.on_pressed();
        }
        sink.on_long_pressed();

        assert_eq!(channel.len(), TOUCH_EVENT_CAPACITY);
        while let Ok(event) = channel.try_receive() {
            assert_eq!(event, TouchEvent::Pressed);
        }
    }

    #[test]
    fn toggled_carries_new_value() {
        let channel: TouchEventChannel = Channel::new();
        let mut sink = &channel;

        sink.on_toggled(true);
        sink.on_toggled(false);

        assert_eq!(channel.try_receive().ok(), Some(TouchEvent::Toggled(true)));
        assert_eq!(channel.try_receive().ok(), Some(TouchEvent::Toggled(false)));
    }

    #[test]
    fn cleared_callback_is_not_called() {
        let mut released = 0;
        let mut count_release = || released += 1;
        {
            let mut callbacks = TouchCallbacks::new();
            callbacks.set_on_released(Some(&mut count_release));
            callbacks.on_released();
            callbacks.set_on_released(None);
            callbacks.on_released();
        }
        assert_eq!(released, 1);
    }
}
