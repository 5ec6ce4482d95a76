//! Vector math and tilt-compensated heading
//!
//! The heading is taken from a device-orientation rotation matrix built out
//! of two vectors measured in the device frame:
//!
//! ```text
//! H = normalize(mag × accel)     east
//! A = normalize(accel)           up (gravity reaction)
//! M = A × H                      magnetic north in the horizontal plane
//!
//!     | Hx Hy Hz |
//! R = | Mx My Mz |      azimuth = atan2(Hy, My)
//!     | Ax Ay Az |
//! ```
//!
//! The azimuth is the angle between the device's y axis (top edge) and
//! magnetic north, clockwise. It is defined whatever the device tilt, which
//! is what makes the heading tilt-compensated.
//!
//! Everything here uses `libm` so it builds without `std`.

use crate::constants::fusion::{
    FREE_FALL_GRAVITY_SQUARED, FULL_TURN_DEG, MIN_HORIZONTAL_FIELD_NORM,
};
use crate::errors::{SensorError, SensorResult};
use crate::time::Timestamp;
use crate::types::Heading;

/// Vector in the device frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    /// x component
    pub x: f32,
    /// y component
    pub y: f32,
    /// z component
    pub z: f32,
}

impl Vector3 {
    /// Construct from components
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Construct from a raw sensor value triple
    pub const fn from_array(values: [f32; 3]) -> Self {
        Self { x: values[0], y: values[1], z: values[2] }
    }

    /// Squared Euclidean norm
    pub fn norm_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        magnitude(self.x, self.y, self.z)
    }

    /// Cross product `self × other`
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Multiply every component by `factor`
    pub fn scale(&self, factor: f32) -> Vector3 {
        Vector3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

/// Euclidean norm of `(x, y, z)`
pub fn magnitude(x: f32, y: f32, z: f32) -> f32 {
    libm::sqrtf(x * x + y * y + z * z)
}

/// Azimuth in degrees `[0, 360)` from a magnetic-field and a gravity vector
///
/// Fails with [`SensorError::ComputationDegenerate`] when the device is in
/// free fall or when the field is (nearly) parallel to gravity, because no
/// horizontal reference exists in either case.
pub fn try_azimuth(mag: Vector3, accel: Vector3) -> SensorResult<f32> {
    if accel.norm_squared() < FREE_FALL_GRAVITY_SQUARED {
        return Err(SensorError::ComputationDegenerate {
            reason: "gravity below free-fall threshold",
        });
    }

    let east = mag.cross(&accel);
    let east_norm = east.norm();
    if !(east_norm >= MIN_HORIZONTAL_FIELD_NORM) {
        // also catches NaN from non-finite inputs
        return Err(SensorError::ComputationDegenerate {
            reason: "magnetic field parallel to gravity",
        });
    }

    let east = east.scale(1.0 / east_norm);
    let up = accel.scale(1.0 / accel.norm());
    let north = up.cross(&east);

    let azimuth_rad = libm::atan2f(east.y, north.y);
    Ok(normalize_degrees(azimuth_rad.to_degrees()))
}

/// Tilt-compensated heading, falling back to 0° when the inputs are degenerate
///
/// The fallback cannot be told apart from a device pointing exactly north;
/// callers that care should use [`try_azimuth`].
pub fn heading(mag: Vector3, accel: Vector3, timestamp_ms: Timestamp) -> Heading {
    match try_azimuth(mag, accel) {
        Ok(degrees) => Heading::magnetic(degrees, timestamp_ms),
        Err(_e) => {
            log_debug!("heading fallback to 0: {}", _e);
            Heading::fallback(timestamp_ms)
        }
    }
}

/// Fold any angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f32) -> f32 {
    let folded = libm::fmodf(degrees, FULL_TURN_DEG);
    // fabsf turns -0.0 into 0.0
    let folded = if folded < 0.0 { folded + FULL_TURN_DEG } else { libm::fabsf(folded) };
    // -1e-6 + 360 rounds to 360 in f32
    if folded >= FULL_TURN_DEG {
        0.0
    } else {
        folded
    }
}

/// Shortest angular distance between two headings, in `[0, 180]`
pub fn angular_distance(a_deg: f32, b_deg: f32) -> f32 {
    let diff = normalize_degrees(a_deg - b_deg);
    if diff > FULL_TURN_DEG / 2.0 {
        FULL_TURN_DEG - diff
    } else {
        diff
    }
}
