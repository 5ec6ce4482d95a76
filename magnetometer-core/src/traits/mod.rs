//! Traits at the seams of the core
//!
//! - [`time`] - where result timestamps come from
//! - [`sensor`] - the platform sensor subsystem and its listeners (std)
//!
//! The platform side is always behind a trait so the reader and the watch
//! manager can be driven by a simulated subsystem in tests and by a real
//! platform binding in production.

pub mod time;

#[cfg(feature = "std")]
pub mod sensor;

pub use time::TimeSource;

#[cfg(feature = "std")]
pub use sensor::{ListenerId, SensorListener, SensorSubsystem};
