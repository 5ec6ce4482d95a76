//! Error Types for Sensor Reads and Heading Computation
//!
//! Errors are small and `Copy`: they are created on sensor dispatch threads
//! and crossed over to worker threads, so no heap data travels with them.
//!
//! ## Error Categories
//!
//! - `SensorUnavailable`: the device has no magnetic-field sensor. Checked
//!   synchronously before any listener is registered.
//! - `Timeout`: no qualifying sample arrived before the request's deadline.
//! - `ComputationDegenerate`: gravity and field vectors cannot define an
//!   orientation (free fall, saturated sensors, near-parallel vectors).
//!
//! ## Host Error Codes
//!
//! Every variant maps to the integer code the scripting host sees in the
//! `{code, message}` error payload:
//!
//! ```text
//! SensorUnavailable      -> 3
//! Timeout                -> 1
//! ComputationDegenerate  -> 2
//! ```
//!
//! ```rust
//! use magnetometer_core::SensorError;
//!
//! let err = SensorError::SensorUnavailable;
//! assert_eq!(err.code(), 3);
//! ```

use thiserror_no_std::Error;

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Host error code for a missing magnetic-field sensor
pub const ERROR_NOT_AVAILABLE: i32 = 3;

/// Host error code for a request that ran past its deadline
pub const ERROR_TIMEOUT: i32 = 1;

/// Host error code for a heading that could not be computed
pub const ERROR_DEGENERATE: i32 = 2;

/// Sensor errors - kept small so they can cross threads by copy
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No magnetic-field sensor on this device
    #[error("Magnetometer not available")]
    SensorUnavailable,

    /// No sample arrived before the deadline
    #[error("Timeout waiting for {what} after {waited_ms} ms")]
    Timeout {
        /// What the request was waiting for
        what: &'static str,
        /// Deadline that elapsed, in milliseconds
        waited_ms: u64,
    },

    /// Gravity and magnetic field vectors do not define an orientation
    #[error("Heading computation degenerate: {reason}")]
    ComputationDegenerate {
        /// Which degeneracy check failed
        reason: &'static str,
    },
}

impl SensorError {
    /// Integer code reported to the scripting host
    pub fn code(&self) -> i32 {
        match self {
            Self::SensorUnavailable => ERROR_NOT_AVAILABLE,
            Self::Timeout { .. } => ERROR_TIMEOUT,
            Self::ComputationDegenerate { .. } => ERROR_DEGENERATE,
        }
    }

    /// True for the deadline-elapsed variant
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
