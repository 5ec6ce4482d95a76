//! Accuracy and calibration tracking
//!
//! One tracker per service. Only magnetic-field accuracy events update it;
//! every read goes through an atomic so sensor dispatch threads and request
//! threads never block each other.
//!
//! Starts optimistic at `High`: until the platform says otherwise the sensor
//! is assumed calibrated.

use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::sensors::{
    ACCURACY_HIGH_RAW, ACCURACY_LOW_RAW, ACCURACY_MEDIUM_RAW, ACCURACY_UNRELIABLE_RAW,
};
use crate::types::SensorKind;

/// Sensor accuracy as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AccuracyLevel {
    /// Readings cannot be trusted
    Unreliable = 0,
    /// Calibration recommended
    Low = 1,
    /// Usable
    Medium = 2,
    /// Fully calibrated
    High = 3,
}

impl AccuracyLevel {
    /// Map a raw platform level; out-of-range values clamp to the ends
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            r if r <= ACCURACY_UNRELIABLE_RAW => Self::Unreliable,
            ACCURACY_LOW_RAW => Self::Low,
            ACCURACY_MEDIUM_RAW => Self::Medium,
            _ => Self::High,
        }
    }

    /// Integer level reported to the host (0..=3)
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Below `Medium` the user should be asked to calibrate
    pub fn needs_calibration(self) -> bool {
        self < Self::Medium
    }

    fn from_u8(value: u8) -> Self {
        Self::from_raw(value as i32)
    }
}

impl Default for AccuracyLevel {
    fn default() -> Self {
        Self::from_raw(ACCURACY_HIGH_RAW)
    }
}

/// Last-known magnetometer accuracy, shared by every listener of a service
#[derive(Debug)]
pub struct AccuracyTracker {
    level: AtomicU8,
}

impl AccuracyTracker {
    /// Tracker in the optimistic startup state (`High`)
    pub fn new() -> Self {
        Self::with_level(AccuracyLevel::default())
    }

    /// Tracker starting at a given level
    pub fn with_level(level: AccuracyLevel) -> Self {
        Self { level: AtomicU8::new(level as u8) }
    }

    /// Apply an accuracy-change event; events from other sensors are ignored
    ///
    /// Returns `true` when the event was applied.
    pub fn on_accuracy_changed(&self, kind: SensorKind, raw_level: i32) -> bool {
        if kind != SensorKind::MagneticField {
            return false;
        }
        let level = AccuracyLevel::from_raw(raw_level);
        let previous = AccuracyLevel::from_u8(self.level.swap(level as u8, Ordering::AcqRel));
        if previous != level {
            log_debug!("magnetometer accuracy {:?} -> {:?}", previous, level);
            if level.needs_calibration() {
                log_warn!("magnetometer accuracy {:?}, calibration needed", level);
            }
        }
        true
    }

    /// Latest accuracy level
    pub fn current_accuracy(&self) -> AccuracyLevel {
        AccuracyLevel::from_u8(self.level.load(Ordering::Acquire))
    }

    /// True while the latest level is below `Medium`
    pub fn is_calibration_needed(&self) -> bool {
        self.current_accuracy().needs_calibration()
    }
}

impl Default for AccuracyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_optimistic() {
        let tracker = AccuracyTracker::new();
        assert_eq!(tracker.current_accuracy(), AccuracyLevel::High);
        assert!(!tracker.is_calibration_needed());
    }

    #[test]
    fn calibration_follows_level_sequence() {
        let tracker = AccuracyTracker::new();
        let mut needed = [false; 4];
        for (i, level) in [3, 2, 1, 0].into_iter().enumerate() {
            tracker.on_accuracy_changed(SensorKind::MagneticField, level);
            needed[i] = tracker.is_calibration_needed();
        }
        assert_eq!(needed, [false, false, true, true]);
    }

    #[test]
    fn accelerometer_accuracy_is_ignored() {
        let tracker = AccuracyTracker::new();
        assert!(!tracker.on_accuracy_changed(SensorKind::Accelerometer, 0));
        assert_eq!(tracker.current_accuracy(), AccuracyLevel::High);
    }

    #[test]
    fn raw_levels_clamp() {
        assert_eq!(AccuracyLevel::from_raw(-1), AccuracyLevel::Unreliable);
        assert_eq!(AccuracyLevel::from_raw(1), AccuracyLevel::Low);
        assert_eq!(AccuracyLevel::from_raw(2), AccuracyLevel::Medium);
        assert_eq!(AccuracyLevel::from_raw(7), AccuracyLevel::High);
        assert_eq!(AccuracyLevel::Medium.as_raw(), 2);
    }
}
