//! Composite `getMagnetometerInfo` result

use magnetometer_core::{MagnetometerService, RawSample, SensorError};
use serde::Serialize;

use crate::config::BridgeConfig;

/// Availability, accuracy and an optional current reading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MagnetometerInfo {
    /// Whether the device has a magnetometer
    pub is_available: bool,
    /// Raw accuracy level, 0 (unreliable) to 3 (high)
    pub accuracy: i32,
    /// Accuracy below medium
    pub calibration_needed: bool,
    /// Host platform name from the bridge config
    pub platform: String,
    /// Omitted when no sample arrived within the info deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<RawSample>,
}

impl MagnetometerInfo {
    /// Collect the info, blocking for at most `config.info_timeout`
    ///
    /// Never fails: a missing sensor or an elapsed deadline only leaves
    /// `reading` empty.
    pub fn collect(service: &MagnetometerService, config: &BridgeConfig) -> Self {
        let is_available = service.is_available();
        let reading = if is_available {
            match service.read_once_within(config.info_timeout) {
                Ok(sample) => Some(sample),
                Err(SensorError::Timeout { waited_ms, .. }) => {
                    log::debug!("info reading omitted after {} ms", waited_ms);
                    None
                }
                Err(e) => {
                    log::warn!("info reading failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            is_available,
            accuracy: service.current_accuracy().as_raw(),
            calibration_needed: service.is_calibration_needed(),
            platform: config.platform.clone(),
            reading,
        }
    }
}
