//! Time-Related Constants
//!
//! Request deadlines and sampling periods, all in milliseconds.

// ===== REQUEST DEADLINES =====

/// Deadline for a one-shot reading, heading or field-strength request (ms).
///
/// Long enough for the slowest delay tier to produce a first sample.
pub const ONE_SHOT_TIMEOUT_MS: u64 = 1000;

/// Deadline for the best-effort reading inside the composite info call (ms).
///
/// Shorter than a one-shot read: on timeout the reading is omitted rather
/// than failing the whole call.
pub const INFO_READ_TIMEOUT_MS: u64 = 500;

// ===== SAMPLING PERIODS =====

/// Sampling period used when a watch request does not give one (ms).
pub const DEFAULT_WATCH_PERIOD_MS: i64 = 100;

/// Periods at or below this select the fastest delay tier (ms).
pub const FASTEST_TIER_MAX_PERIOD_MS: i64 = 20;

/// Periods at or below this select the game delay tier (ms).
pub const GAME_TIER_MAX_PERIOD_MS: i64 = 60;

/// Periods at or below this select the UI delay tier (ms).
///
/// Anything slower selects the normal tier.
pub const UI_TIER_MAX_PERIOD_MS: i64 = 200;
