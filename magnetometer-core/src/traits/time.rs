//! Time Source Abstraction
//!
//! Result timestamps come from a `TimeSource` so tests can pin them.
//!
//! ## Implementations
//!
//! - `SystemTime`: wall clock, milliseconds since the Unix epoch (std)
//! - `FixedTime`: settable clock for deterministic tests

use crate::time::Timestamp;

/// Source of result timestamps
///
/// `now()` is called from sensor dispatch threads and from request threads,
/// hence the `Send + Sync` bound.
///
/// ```rust
/// use magnetometer_core::traits::TimeSource;
/// use magnetometer_core::time::Timestamp;
///
/// struct GpsTime;
///
/// impl TimeSource for GpsTime {
///     fn now(&self) -> Timestamp {
///         0 // read from the GPS module
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait TimeSource: Send + Sync {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Wall clock (may jump) as opposed to monotonic
    fn is_wall_clock(&self) -> bool;
}
