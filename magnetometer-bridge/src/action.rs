//! Host action names and their arguments
//!
//! Missing or `null` arguments take the configured defaults; arguments of
//! the wrong type are rejected rather than silently defaulted.

use serde_json::Value;

use crate::config::BridgeConfig;
use crate::BridgeError;

/// A parsed host action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// `isAvailable`: magnetometer present, as `1` / `0`
    IsAvailable,
    /// `getReading`: next raw sample
    GetReading,
    /// `getHeading`: next heading, needs both sensors
    GetHeading,
    /// `watchReadings`: stream raw samples
    WatchReadings {
        /// Requested sampling period
        period_ms: i64,
    },
    /// `stopWatch`: end the raw watch
    StopWatch,
    /// `watchHeading`: stream headings
    WatchHeading {
        /// Requested sampling period
        period_ms: i64,
        /// Minimum change between delivered headings, 0 for all
        filter_deg: f32,
    },
    /// `stopWatchHeading`: end the heading watch
    StopWatchHeading,
    /// `getMagnetometerInfo`: availability, accuracy and a best-effort reading
    GetMagnetometerInfo,
    /// `getAccuracy`: raw accuracy level
    GetAccuracy,
    /// `isCalibrationNeeded`: accuracy below medium, as `1` / `0`
    IsCalibrationNeeded,
    /// `getFieldStrength`: rounded magnitude of the next sample
    GetFieldStrength,
}

impl Action {
    /// Parse an action name and its positional arguments
    pub fn parse(name: &str, args: &[Value], config: &BridgeConfig) -> Result<Self, BridgeError> {
        let action = match name {
            "isAvailable" => Self::IsAvailable,
            "getReading" => Self::GetReading,
            "getHeading" => Self::GetHeading,
            "watchReadings" => Self::WatchReadings {
                period_ms: period_arg("watchReadings", args, config.default_period_ms)?,
            },
            "stopWatch" => Self::StopWatch,
            "watchHeading" => Self::WatchHeading {
                period_ms: period_arg("watchHeading", args, config.default_period_ms)?,
                filter_deg: filter_arg("watchHeading", args, config.default_filter_deg)?,
            },
            "stopWatchHeading" => Self::StopWatchHeading,
            "getMagnetometerInfo" => Self::GetMagnetometerInfo,
            "getAccuracy" => Self::GetAccuracy,
            "isCalibrationNeeded" => Self::IsCalibrationNeeded,
            "getFieldStrength" => Self::GetFieldStrength,
            other => return Err(BridgeError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }

    /// Host name of this action
    pub fn name(&self) -> &'static str {
        match self {
            Self::IsAvailable => "isAvailable",
            Self::GetReading => "getReading",
            Self::GetHeading => "getHeading",
            Self::WatchReadings { .. } => "watchReadings",
            Self::StopWatch => "stopWatch",
            Self::WatchHeading { .. } => "watchHeading",
            Self::StopWatchHeading => "stopWatchHeading",
            Self::GetMagnetometerInfo => "getMagnetometerInfo",
            Self::GetAccuracy => "getAccuracy",
            Self::IsCalibrationNeeded => "isCalibrationNeeded",
            Self::GetFieldStrength => "getFieldStrength",
        }
    }

    /// Whether the action waits on a sensor and must run off the dispatcher
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::GetReading | Self::GetHeading | Self::GetFieldStrength | Self::GetMagnetometerInfo
        )
    }

    /// Whether the action keeps its callback open
    pub fn is_watch(&self) -> bool {
        matches!(self, Self::WatchReadings { .. } | Self::WatchHeading { .. })
    }
}

fn period_arg(action: &'static str, args: &[Value], default: i64) -> Result<i64, BridgeError> {
    match args.first() {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .ok_or(BridgeError::InvalidArgument {
                action,
                index: 0,
                reason: "period must be a number of milliseconds",
            }),
    }
}

fn filter_arg(action: &'static str, args: &[Value], default: f32) -> Result<f32, BridgeError> {
    let invalid = |reason| BridgeError::InvalidArgument { action, index: 1, reason };
    match args.get(1) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => {
            let degrees = value.as_f64().ok_or_else(|| invalid("filter must be a number of degrees"))?;
            if !degrees.is_finite() || degrees < 0.0 {
                return Err(invalid("filter must be a non-negative number"));
            }
            Ok(degrees as f32)
        }
    }
}
