//! Core sensor model for the magnetometer bridge
//!
//! Turns raw magnetic-field and acceleration samples into readings and
//! tilt-compensated compass headings, and manages how one-shot reads and
//! continuous watches are multiplexed onto the platform sensor subsystem.
//!
//! The pure parts (vector math, sampling policy, accuracy tracking, errors)
//! build without `std`. The reading service, the watch manager and the
//! simulated sensor subsystem need threads and are gated on the `std` feature.
//!
//! ```no_run
//! use std::sync::Arc;
//! use magnetometer_core::{MagnetometerService, SimulatedSensorSubsystem};
//!
//! let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
//! let service = MagnetometerService::new(sensors);
//!
//! match service.read_heading_once() {
//!     Ok(heading) => println!("heading {:.1}", heading.magnetic_heading_deg),
//!     Err(e) => println!("no heading: {}", e),
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod accuracy;
pub mod constants;
pub mod errors;
pub mod fusion;
pub mod math;
pub mod rate;
pub mod time;
pub mod traits;
pub mod types;

#[cfg(feature = "std")]
pub mod latch;
#[cfg(feature = "std")]
pub mod reader;
#[cfg(feature = "std")]
pub mod service;
#[cfg(feature = "std")]
pub mod simulated;
#[cfg(feature = "std")]
pub mod watch;

// Public API
pub use accuracy::{AccuracyLevel, AccuracyTracker};
pub use errors::{SensorError, SensorResult};
pub use math::{heading, magnitude, try_azimuth, Vector3};
pub use rate::{delay_tier, DelayTier};
pub use traits::TimeSource;
pub use types::{Heading, RawSample, SensorEvent, SensorKind};

#[cfg(feature = "std")]
pub use traits::{ListenerId, SensorListener, SensorSubsystem};
#[cfg(feature = "std")]
pub use reader::SingleShotReader;
#[cfg(feature = "std")]
pub use service::{MagnetometerService, ServiceConfig};
#[cfg(feature = "std")]
pub use simulated::SimulatedSensorSubsystem;
#[cfg(feature = "std")]
pub use watch::{SubscriptionManager, WatchSink, WatchStream};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
