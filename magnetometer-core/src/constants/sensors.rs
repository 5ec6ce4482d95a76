//! Sensor Reporting Conventions
//!
//! Values the platform sensor subsystem uses when it reports accuracy, and
//! the sentinels this crate reports back when a quantity is unknown.

// ===== ACCURACY LEVELS =====

/// Raw platform level: readings cannot be trusted.
///
/// Platforms also report -1 ("no contact"); anything at or below this
/// value is treated as unreliable.
pub const ACCURACY_UNRELIABLE_RAW: i32 = 0;

/// Raw platform level: low accuracy, calibration recommended.
pub const ACCURACY_LOW_RAW: i32 = 1;

/// Raw platform level: medium accuracy.
///
/// Lowest level that does not ask the user to calibrate.
pub const ACCURACY_MEDIUM_RAW: i32 = 2;

/// Raw platform level: maximum accuracy.
///
/// Also the level assumed before the first accuracy event arrives.
pub const ACCURACY_HIGH_RAW: i32 = 3;

// ===== HEADING SENTINELS =====

/// Heading accuracy reported when the platform gives no estimate.
///
/// The rotation-matrix heading has no error bound attached, so every
/// heading this crate produces carries this value.
pub const HEADING_ACCURACY_UNAVAILABLE: i32 = -1;

/// Platform name reported by the composite info call.
pub const PLATFORM_NAME: &str = "android";
