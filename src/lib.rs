//! A capacitive touch button with LED feedback for Pico 1 and 2.
//!
//! The [`touch_button`] module holds the whole device: hysteresis on the raw touch
//! intensity, toggle and long-press tracking, four LED behaviors, and a periodic
//! sampling loop that can be started and stopped.
//!
//! # Glossary
//!
//! - **Intensity:** the raw touch reading. Lower means stronger touch.
//! - **Dead band:** readings between the press and release thresholds. They never
//!   change the button's state, which keeps it from chattering near one threshold.
//! - **Press episode:** the time from one press to the following release.
//! - **Wiring mode:** whether the touch pin is shared with the LED (two-wire) or not
//!   (three-wire).
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

#[cfg(all(not(feature = "arm"), not(feature = "host")))]
compile_error!("Must enable the 'arm' architecture feature");

// Must come first so the logging macros are visible to the modules below.
#[macro_use]
mod fmt;

mod error;
pub mod touch_button;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
