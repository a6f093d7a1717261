//! Error and result types shared by the crate.

use derive_more::{Display, Error};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by touch button construction and task spawning.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The press threshold must be strictly below the release threshold so the
    /// hysteresis dead band is non-empty.
    #[display("threshold_on ({threshold_on}) must be below threshold_off ({threshold_off})")]
    ThresholdsNotOrdered {
        /// Configured press threshold.
        threshold_on: u16,
        /// Configured release threshold.
        threshold_off: u16,
    },

    /// The sample period must be longer than zero.
    #[display("sample_period must be greater than zero")]
    ZeroSamplePeriod,

    /// The background sampling task could not be spawned.
    #[cfg(not(feature = "host"))]
    #[display("failed to spawn task: {_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),
}
