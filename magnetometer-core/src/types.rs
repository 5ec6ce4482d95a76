//! Data types shared by the reader, the watch manager and the bridge
//!
//! `RawSample` and `Heading` are what the scripting host receives; their
//! serialized field names are the host's wire names. `SensorEvent` is what
//! the platform sensor subsystem hands a listener.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::sensors::HEADING_ACCURACY_UNAVAILABLE;
use crate::math::{self, Vector3};
use crate::time::Timestamp;

/// Physical sensors the core listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorKind {
    /// 3-axis magnetometer, values in microtesla
    MagneticField,
    /// 3-axis accelerometer including gravity, values in m/s²
    Accelerometer,
}

/// Event delivered by the platform sensor subsystem
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// A new sample
    Data {
        /// Sensor that produced the sample
        kind: SensorKind,
        /// x, y, z in the device frame
        values: [f32; 3],
        /// Platform event time in nanoseconds (monotonic, not wall clock)
        timestamp_ns: u64,
    },
    /// The sensor's accuracy level changed
    Accuracy {
        /// Sensor whose accuracy changed
        kind: SensorKind,
        /// Raw platform level, see [`crate::accuracy::AccuracyLevel::from_raw`]
        level: i32,
    },
}

impl SensorEvent {
    /// Sensor this event belongs to
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Data { kind, .. } | Self::Accuracy { kind, .. } => *kind,
        }
    }
}

/// One magnetometer reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawSample {
    /// Field along the device x axis (µT)
    pub x: f32,
    /// Field along the device y axis (µT)
    pub y: f32,
    /// Field along the device z axis (µT)
    pub z: f32,
    /// Total field strength (µT)
    pub magnitude: f32,
    /// Wall-clock time the reading was taken (ms since Unix epoch)
    #[cfg_attr(feature = "serde", serde(rename = "timestamp"))]
    pub timestamp_ms: Timestamp,
}

impl RawSample {
    /// Build a sample from raw sensor values, deriving the magnitude
    pub fn from_values(values: [f32; 3], timestamp_ms: Timestamp) -> Self {
        let [x, y, z] = values;
        Self {
            x,
            y,
            z,
            magnitude: math::magnitude(x, y, z),
            timestamp_ms,
        }
    }

    /// Field strength rounded to whole microtesla
    pub fn field_strength(&self) -> i32 {
        libm::roundf(self.magnitude) as i32
    }

    /// The field as a vector
    pub fn vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Compass heading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Heading {
    /// Degrees clockwise from magnetic north, in `[0, 360)`
    #[cfg_attr(feature = "serde", serde(rename = "magneticHeading"))]
    pub magnetic_heading_deg: f32,
    /// Degrees from geographic north; equal to the magnetic heading since
    /// no declination source is available
    #[cfg_attr(feature = "serde", serde(rename = "trueHeading"))]
    pub true_heading_deg: f32,
    /// Heading error bound in degrees, -1 when unknown
    pub heading_accuracy: i32,
    /// Wall-clock time the heading was computed (ms since Unix epoch)
    #[cfg_attr(feature = "serde", serde(rename = "timestamp"))]
    pub timestamp_ms: Timestamp,
}

impl Heading {
    /// Heading with no declination correction and no accuracy estimate
    pub fn magnetic(degrees: f32, timestamp_ms: Timestamp) -> Self {
        Self {
            magnetic_heading_deg: degrees,
            true_heading_deg: degrees,
            heading_accuracy: HEADING_ACCURACY_UNAVAILABLE,
            timestamp_ms,
        }
    }

    /// Fallback reported when the computation is degenerate
    pub fn fallback(timestamp_ms: Timestamp) -> Self {
        Self::magnetic(0.0, timestamp_ms)
    }
}
