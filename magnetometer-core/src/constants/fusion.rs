//! Heading Fusion Constants
//!
//! Thresholds for building a rotation matrix out of a gravity vector and a
//! magnetic-field vector. They match the platform's own rotation-matrix
//! routine so headings agree with what native compass apps show.

/// Standard gravity (m/s²).
///
/// Source: CGPM 1901 conventional value
pub const STANDARD_GRAVITY: f32 = 9.81;

/// Squared acceleration below which the device is considered in free fall.
///
/// 10% of g, squared. Below this the accelerometer no longer tells us
/// which way is down.
pub const FREE_FALL_GRAVITY_SQUARED: f32 = 0.01 * STANDARD_GRAVITY * STANDARD_GRAVITY;

/// Minimum norm of `mag × gravity` for a usable east axis.
///
/// Smaller values mean the field is nearly parallel to gravity (magnetic
/// pole, saturated sensor) or absent, and east is undefined.
pub const MIN_HORIZONTAL_FIELD_NORM: f32 = 0.1;

/// Degrees in a full turn.
pub const FULL_TURN_DEG: f32 = 360.0;
