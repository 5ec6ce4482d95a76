//! Rolling gravity/field buffer for heading computation
//!
//! A heading needs one magnetic sample and one acceleration sample. The two
//! sensors report independently and at different rates, so the latest value
//! of each is kept and a heading becomes computable once both have been
//! seen at least once. Later samples replace earlier ones; nothing is queued.

use crate::math::Vector3;
use crate::types::SensorKind;

/// Latest magnetic and acceleration vectors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FusionBuffer {
    mag: Option<Vector3>,
    accel: Option<Vector3>,
}

impl FusionBuffer {
    /// Empty buffer
    pub const fn new() -> Self {
        Self { mag: None, accel: None }
    }

    /// Store a sample and return both vectors once each has been seen
    pub fn update(&mut self, kind: SensorKind, values: [f32; 3]) -> Option<(Vector3, Vector3)> {
        let vector = Vector3::from_array(values);
        match kind {
            SensorKind::MagneticField => self.mag = Some(vector),
            SensorKind::Accelerometer => self.accel = Some(vector),
        }
        self.pair()
    }

    /// Both vectors, if both have been seen
    pub fn pair(&self) -> Option<(Vector3, Vector3)> {
        match (self.mag, self.accel) {
            (Some(mag), Some(accel)) => Some((mag, accel)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_both_sensors() {
        let mut buffer = FusionBuffer::new();
        assert!(buffer.update(SensorKind::MagneticField, [1.0, 2.0, 3.0]).is_none());
        assert!(buffer.update(SensorKind::MagneticField, [4.0, 5.0, 6.0]).is_none());

        let (mag, accel) = buffer.update(SensorKind::Accelerometer, [0.0, 0.0, 9.8]).unwrap();
        assert_eq!(mag, Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(accel, Vector3::new(0.0, 0.0, 9.8));
    }

    #[test]
    fn latest_sample_wins() {
        let mut buffer = FusionBuffer::new();
        buffer.update(SensorKind::Accelerometer, [0.0, 0.0, 9.8]);
        buffer.update(SensorKind::MagneticField, [1.0, 0.0, 0.0]);
        let (mag, _) = buffer.update(SensorKind::MagneticField, [2.0, 0.0, 0.0]).unwrap();
        assert_eq!(mag.x, 2.0);
    }
}
