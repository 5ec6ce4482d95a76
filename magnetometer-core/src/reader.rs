//! Single-shot reading service
//!
//! Each request registers a transient listener, blocks the calling thread
//! until the listener has what it needs or the deadline passes, and then
//! unregisters the listener. Callers that must not block (the host bridge)
//! run these on a worker pool.
//!
//! ```text
//! caller thread               sensor dispatch thread
//! ─────────────               ──────────────────────
//! check availability
//! register listener ───────▶  on_event(Data) ─┐
//! latch.wait_timeout ◀────────────────────────┘ latch.complete
//! unregister listener
//! ```
//!
//! The availability check happens before any registration, so a device
//! without a magnetometer fails immediately with `SensorUnavailable`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::accuracy::AccuracyTracker;
use crate::errors::{SensorError, SensorResult};
use crate::fusion::FusionBuffer;
use crate::latch::Latch;
use crate::math;
use crate::rate::DelayTier;
use crate::traits::{ListenerId, SensorListener, SensorSubsystem, TimeSource};
use crate::types::{Heading, RawSample, SensorEvent, SensorKind};

/// Completes its latch with the first magnetic sample
struct FirstSampleListener {
    latch: Arc<Latch<RawSample>>,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
}

impl SensorListener for FirstSampleListener {
    fn on_event(&self, event: &SensorEvent) {
        match *event {
            SensorEvent::Data { kind: SensorKind::MagneticField, values, .. } => {
                if self.latch.is_done() {
                    return;
                }
                self.latch.complete(RawSample::from_values(values, self.clock.now()));
            }
            SensorEvent::Accuracy { kind, level } => {
                self.tracker.on_accuracy_changed(kind, level);
            }
            SensorEvent::Data { .. } => {}
        }
    }
}

/// Buffers magnetic and acceleration samples until a heading is computable
struct HeadingOnceListener {
    latch: Arc<Latch<Heading>>,
    buffer: Mutex<FusionBuffer>,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
}

impl SensorListener for HeadingOnceListener {
    fn on_event(&self, event: &SensorEvent) {
        match *event {
            SensorEvent::Data { kind, values, .. } => {
                if self.latch.is_done() {
                    return;
                }
                let pair = self
                    .buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update(kind, values);
                if let Some((mag, accel)) = pair {
                    self.latch.complete(math::heading(mag, accel, self.clock.now()));
                }
            }
            SensorEvent::Accuracy { kind, level } => {
                self.tracker.on_accuracy_changed(kind, level);
            }
        }
    }
}

/// Blocking one-shot reads against a sensor subsystem
#[derive(Clone)]
pub struct SingleShotReader {
    sensors: Arc<dyn SensorSubsystem>,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
    timeout: Duration,
    tier: DelayTier,
}

impl SingleShotReader {
    /// Reader with the given deadline and registration tier
    pub fn new(
        sensors: Arc<dyn SensorSubsystem>,
        tracker: Arc<AccuracyTracker>,
        clock: Arc<dyn TimeSource>,
        timeout: Duration,
        tier: DelayTier,
    ) -> Self {
        Self { sensors, tracker, clock, timeout, tier }
    }

    /// Deadline applied by `read_once`, `read_heading_once` and
    /// `read_field_strength`
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Next magnetometer sample
    pub fn read_once(&self) -> SensorResult<RawSample> {
        self.read_sample("magnetometer reading", self.timeout)
    }

    /// Next magnetometer sample, with a caller-chosen deadline
    pub fn read_once_within(&self, timeout: Duration) -> SensorResult<RawSample> {
        self.read_sample("magnetometer reading", timeout)
    }

    /// Field strength of the next sample, rounded to whole microtesla
    pub fn read_field_strength(&self) -> SensorResult<i32> {
        self.read_sample("field strength", self.timeout)
            .map(|sample| sample.field_strength())
    }

    /// Heading from the first magnetic and acceleration samples to arrive
    ///
    /// Without an accelerometer only the magnetometer is registered and the
    /// request always ends in `Timeout`.
    pub fn read_heading_once(&self) -> SensorResult<Heading> {
        self.ensure_available()?;

        let latch = Arc::new(Latch::new());
        let listener: Arc<dyn SensorListener> = Arc::new(HeadingOnceListener {
            latch: Arc::clone(&latch),
            buffer: Mutex::new(FusionBuffer::new()),
            tracker: Arc::clone(&self.tracker),
            clock: Arc::clone(&self.clock),
        });

        let id = ListenerId::next();
        self.register(id, Arc::clone(&listener), SensorKind::MagneticField);
        if self.sensors.has_sensor(SensorKind::Accelerometer) {
            self.register(id, listener, SensorKind::Accelerometer);
        } else {
            log_debug!("no accelerometer, heading request {:?} cannot complete", id);
        }

        self.finish(id, &latch, "heading", self.timeout)
    }

    fn read_sample(&self, what: &'static str, timeout: Duration) -> SensorResult<RawSample> {
        self.ensure_available()?;

        let latch = Arc::new(Latch::new());
        let listener = Arc::new(FirstSampleListener {
            latch: Arc::clone(&latch),
            tracker: Arc::clone(&self.tracker),
            clock: Arc::clone(&self.clock),
        });

        let id = ListenerId::next();
        self.register(id, listener, SensorKind::MagneticField);
        self.finish(id, &latch, what, timeout)
    }

    fn ensure_available(&self) -> SensorResult<()> {
        if self.sensors.has_sensor(SensorKind::MagneticField) {
            Ok(())
        } else {
            Err(SensorError::SensorUnavailable)
        }
    }

    fn register(&self, id: ListenerId, listener: Arc<dyn SensorListener>, kind: SensorKind) {
        if !self.sensors.register_listener(id, listener, kind, self.tier) {
            log_warn!("registration of {:?} for {:?} refused", id, kind);
        }
    }

    // Wait on the latch, then unregister on both the data and the timeout path
    fn finish<T>(
        &self,
        id: ListenerId,
        latch: &Latch<T>,
        what: &'static str,
        timeout: Duration,
    ) -> SensorResult<T> {
        let outcome = latch.wait_timeout(timeout);
        self.sensors.unregister_listener(id, None);

        outcome.ok_or_else(|| {
            log_debug!("{} request {:?} timed out after {:?}", what, id, timeout);
            SensorError::Timeout {
                what,
                waited_ms: timeout.as_millis() as u64,
            }
        })
    }
}
