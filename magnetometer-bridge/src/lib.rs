//! Scripting-Host Bridge for the Magnetometer Core
//!
//! ## Overview
//!
//! The scripting host talks to the device through named actions. Each action
//! arrives as a JSON request, is mapped onto one call of
//! [`MagnetometerService`](magnetometer_core::MagnetometerService), and is
//! answered with one or more JSON replies on a per-request channel.
//!
//! ## Actions
//!
//! | Action | Args | Reply |
//! |--------|------|-------|
//! | `isAvailable` | | `1` / `0` |
//! | `getReading` | | reading object |
//! | `getHeading` | | heading object |
//! | `getFieldStrength` | | integer µT |
//! | `watchReadings` | `[periodMs = 100]` | `noResult`, then a stream of readings |
//! | `stopWatch` | | empty |
//! | `watchHeading` | `[periodMs = 100, filterDeg = 0]` | `noResult`, then a stream of headings |
//! | `stopWatchHeading` | | empty |
//! | `getMagnetometerInfo` | | info object, `reading` omitted on timeout |
//! | `getAccuracy` | | `0..=3` |
//! | `isCalibrationNeeded` | | `1` / `0` |
//!
//! ## Reply Protocol
//!
//! ```text
//! one-shot:  request ──▶ ok | error                   (keepAlive = false)
//! watch:     request ──▶ noResult ─▶ ok ─▶ ok ─▶ ...  (keepAlive = true)
//! ```
//!
//! `noResult` is sent only once the watch is attached, so a watch that fails
//! to start answers with its error alone. A superseded or stopped watch
//! produces no reply after the stop (or superseding start) has been
//! answered; the host drops its callback when that reply resolves.
//!
//! ## Threading
//!
//! Blocking reads run on tokio's blocking pool, so the dispatcher's own
//! task never waits on a sensor. Watch replies are produced on the sensor
//! dispatch thread and pushed into an unbounded channel.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use magnetometer_bridge::{Bridge, BridgeConfig, Request};
//! use magnetometer_core::{MagnetometerService, SimulatedSensorSubsystem};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
//! let bridge = Bridge::new(Arc::new(MagnetometerService::new(sensors)), BridgeConfig::new());
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! bridge.execute(Request::new("cb1", "isAvailable"), tx).await;
//! let reply = rx.recv().await.ok_or("no reply")?;
//! assert_eq!(reply.payload, serde_json::json!(1));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod info;

// Re-export common types
pub use action::Action;
pub use config::BridgeConfig;
pub use dispatch::{Bridge, DispatchStats};
pub use envelope::{Reply, ReplyStatus, Request};
pub use info::MagnetometerInfo;

use magnetometer_core::SensorError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host error code for errors without a dedicated code
pub const ERROR_GENERIC: i32 = 0;

/// Bridge errors
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Failure reported by the sensor core
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// No action with this name
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// An argument had the wrong type or an out-of-range value
    #[error("Invalid argument {index} for {action}: {reason}")]
    InvalidArgument {
        /// Action the argument was passed to
        action: &'static str,
        /// Zero-based position in `args`
        index: usize,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Request or reply could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A blocking worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    WorkerFailed(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl BridgeError {
    /// Integer code reported to the host
    pub fn code(&self) -> i32 {
        match self {
            Self::Sensor(e) => e.code(),
            _ => ERROR_GENERIC,
        }
    }

    /// `{code, message}` error payload
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Error object handed to the host's error callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error code; 3 means the magnetometer is missing
    pub code: i32,
    /// Human-readable description
    pub message: String,
}
