//! Logging macros that forward to [`defmt`].
//!
//! Under the `host` feature the macros compile to nothing (arguments are still
//! borrowed so they stay "used"), which lets host tests link without a defmt
//! global logger.
#![allow(unused_macros, reason = "not every level is used in every build")]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(feature = "host"))]
            ::defmt::trace!($s $(, $x)*);
            #[cfg(feature = "host")]
            let _ = ($( &$x, )*);
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(feature = "host"))]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(feature = "host")]
            let _ = ($( &$x, )*);
        }
    };
}

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(feature = "host"))]
            ::defmt::info!($s $(, $x)*);
            #[cfg(feature = "host")]
            let _ = ($( &$x, )*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(not(feature = "host"))]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(feature = "host")]
            let _ = ($( &$x, )*);
        }
    };
}
