//! In-process sensor subsystem for tests and replay
//!
//! `SimulatedSensorSubsystem` implements [`SensorSubsystem`] without any
//! hardware. Tests choose which sensors exist, inject data and accuracy
//! events, and inspect what the core registered:
//!
//! - how many listeners are currently registered per sensor,
//! - how many register/unregister calls were made in total,
//! - which delay tier the last registration asked for.
//!
//! Events are delivered synchronously on the thread that calls `emit`, the
//! way a platform delivers on its dispatch thread. No internal lock is held
//! while a listener runs, so listeners may unregister themselves.
//!
//! ```rust
//! use magnetometer_core::{SensorKind, SimulatedSensorSubsystem};
//!
//! let sensors = SimulatedSensorSubsystem::with_all_sensors();
//! assert!(sensors.has_sensor(SensorKind::MagneticField));
//! assert_eq!(sensors.emit_magnetic([20.0, 0.0, -40.0]), 0); // nobody listening
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::rate::DelayTier;
use crate::traits::{ListenerId, SensorListener, SensorSubsystem};
use crate::types::{SensorEvent, SensorKind};

struct Registration {
    id: ListenerId,
    kind: SensorKind,
    tier: DelayTier,
    listener: Arc<dyn SensorListener>,
}

/// Sensor subsystem driven by the test
pub struct SimulatedSensorSubsystem {
    has_magnetometer: bool,
    has_accelerometer: bool,
    registrations: Mutex<Vec<Registration>>,
    changed: Condvar,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    epoch: Instant,
}

impl SimulatedSensorSubsystem {
    /// Subsystem with the given sensors present
    pub fn new(has_magnetometer: bool, has_accelerometer: bool) -> Self {
        Self {
            has_magnetometer,
            has_accelerometer,
            registrations: Mutex::new(Vec::new()),
            changed: Condvar::new(),
            register_calls: AtomicUsize::new(0),
            unregister_calls: AtomicUsize::new(0),
            epoch: Instant::now(),
        }
    }

    /// Magnetometer and accelerometer present
    pub fn with_all_sensors() -> Self {
        Self::new(true, true)
    }

    /// Magnetometer only
    pub fn without_accelerometer() -> Self {
        Self::new(true, false)
    }

    /// Neither sensor present
    pub fn without_sensors() -> Self {
        Self::new(false, false)
    }

    /// Whether `kind` exists on the simulated device
    pub fn has_sensor(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::MagneticField => self.has_magnetometer,
            SensorKind::Accelerometer => self.has_accelerometer,
        }
    }

    /// Deliver an event to every listener registered for its sensor
    ///
    /// Returns the number of listeners that received it.
    pub fn emit(&self, event: SensorEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<Arc<dyn SensorListener>> = self
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in &targets {
            listener.on_event(&event);
        }
        targets.len()
    }

    /// Deliver a magnetometer sample (µT)
    pub fn emit_magnetic(&self, values: [f32; 3]) -> usize {
        self.emit_data(SensorKind::MagneticField, values)
    }

    /// Deliver an accelerometer sample (m/s²)
    pub fn emit_acceleration(&self, values: [f32; 3]) -> usize {
        self.emit_data(SensorKind::Accelerometer, values)
    }

    /// Deliver an accuracy change
    pub fn emit_accuracy(&self, kind: SensorKind, level: i32) -> usize {
        self.emit(SensorEvent::Accuracy { kind, level })
    }

    fn emit_data(&self, kind: SensorKind, values: [f32; 3]) -> usize {
        let timestamp_ns = self.epoch.elapsed().as_nanos() as u64;
        self.emit(SensorEvent::Data { kind, values, timestamp_ns })
    }

    /// Listeners currently registered for `kind`
    pub fn listener_count(&self, kind: SensorKind) -> usize {
        self.lock().iter().filter(|r| r.kind == kind).count()
    }

    /// Registrations across all sensors
    pub fn total_registrations(&self) -> usize {
        self.lock().len()
    }

    /// Total `register_listener` calls so far
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Total `unregister_listener` calls so far
    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    /// Tier requested by the most recent registration for `kind`
    pub fn last_tier(&self, kind: SensorKind) -> Option<DelayTier> {
        self.lock().iter().rev().find(|r| r.kind == kind).map(|r| r.tier)
    }

    /// Block until at least `count` listeners are registered for `kind`
    ///
    /// Returns `false` on timeout. Lets a test inject events only after a
    /// request running on another thread has registered.
    pub fn wait_for_listeners(&self, kind: SensorKind, count: usize, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |regs| {
                regs.iter().filter(|r| r.kind == kind).count() < count
            })
            .unwrap_or_else(PoisonError::into_inner);
        guard.iter().filter(|r| r.kind == kind).count() >= count
    }

    // Registration list is only ever pushed to or filtered; always consistent
    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        self.registrations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimulatedSensorSubsystem {
    fn default() -> Self {
        Self::with_all_sensors()
    }
}

impl SensorSubsystem for SimulatedSensorSubsystem {
    fn has_sensor(&self, kind: SensorKind) -> bool {
        SimulatedSensorSubsystem::has_sensor(self, kind)
    }

    fn register_listener(
        &self,
        id: ListenerId,
        listener: Arc<dyn SensorListener>,
        kind: SensorKind,
        tier: DelayTier,
    ) -> bool {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if !self.has_sensor(kind) {
            return false;
        }
        self.lock().push(Registration { id, kind, tier, listener });
        self.changed.notify_all();
        true
    }

    fn unregister_listener(&self, id: ListenerId, kind: Option<SensorKind>) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .retain(|r| !(r.id == id && kind.map_or(true, |k| r.kind == k)));
        self.changed.notify_all();
    }
}
