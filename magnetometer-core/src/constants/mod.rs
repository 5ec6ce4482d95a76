//! Constants for the Magnetometer Core
//!
//! Every numeric threshold, timeout and default used by the crate lives here,
//! with its unit in the name and a note on where the value comes from.
//!
//! ## Organization
//!
//! - **Sensors**: accuracy levels and heading sentinels
//! - **Time**: request deadlines, default sampling periods, delay-tier thresholds
//! - **Fusion**: gravity and degeneracy thresholds for the heading computation

/// Accuracy levels and heading sentinels reported by the platform.
pub mod sensors;

/// Deadlines, sampling periods and delay-tier thresholds.
pub mod time;

/// Thresholds for the rotation-matrix heading computation.
pub mod fusion;

// Re-export commonly used constants for convenience
pub use sensors::{HEADING_ACCURACY_UNAVAILABLE, PLATFORM_NAME};

pub use time::{
    DEFAULT_WATCH_PERIOD_MS, INFO_READ_TIMEOUT_MS, ONE_SHOT_TIMEOUT_MS,
};

pub use fusion::{FREE_FALL_GRAVITY_SQUARED, MIN_HORIZONTAL_FIELD_NORM, STANDARD_GRAVITY};
