//! Platform Sensor Subsystem Abstraction
//!
//! The core never talks to the platform directly. It registers listeners
//! through [`SensorSubsystem`] and receives [`SensorEvent`]s on whatever
//! thread the platform dispatches from.
//!
//! ## Contract
//!
//! - A listener is identified by a [`ListenerId`] chosen by the caller; the
//!   same id may be registered for several sensors.
//! - `unregister_listener(id, None)` removes the listener from every sensor,
//!   `Some(kind)` from that sensor only. Unknown ids are ignored.
//! - After `unregister_listener` returns, the subsystem must not start new
//!   deliveries to that listener. A delivery already running on another
//!   thread may still complete; listeners guard against that themselves.
//! - Failed registrations are reported through the return value and never
//!   retried by the core.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::rate::DelayTier;
use crate::types::{SensorEvent, SensorKind};

/// Identity of a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receiver of sensor events
///
/// Called from the platform's dispatch thread; must not block.
pub trait SensorListener: Send + Sync {
    /// A data or accuracy event for one of the sensors this listener is
    /// registered with
    fn on_event(&self, event: &SensorEvent);
}

/// The platform sensor subsystem
///
/// ```rust
/// use std::sync::Arc;
/// use magnetometer_core::{DelayTier, ListenerId, SensorKind, SensorListener, SensorSubsystem};
///
/// struct NoSensors;
///
/// impl SensorSubsystem for NoSensors {
///     fn has_sensor(&self, _kind: SensorKind) -> bool {
///         false
///     }
///
///     fn register_listener(
///         &self,
///         _id: ListenerId,
///         _listener: Arc<dyn SensorListener>,
///         _kind: SensorKind,
///         _tier: DelayTier,
///     ) -> bool {
///         false
///     }
///
///     fn unregister_listener(&self, _id: ListenerId, _kind: Option<SensorKind>) {}
/// }
/// ```
pub trait SensorSubsystem: Send + Sync {
    /// Whether the device has this sensor
    fn has_sensor(&self, kind: SensorKind) -> bool;

    /// Start delivering `kind` events to `listener` at roughly `tier`
    ///
    /// Returns `false` if the platform refused the registration.
    fn register_listener(
        &self,
        id: ListenerId,
        listener: Arc<dyn SensorListener>,
        kind: SensorKind,
        tier: DelayTier,
    ) -> bool;

    /// Stop delivering to `id`, for one sensor or all of them
    fn unregister_listener(&self, id: ListenerId, kind: Option<SensorKind>);
}
