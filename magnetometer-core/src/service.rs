//! Service object owning one device's sensor state
//!
//! `MagnetometerService` bundles the single-shot reader, the subscription
//! manager and the accuracy tracker around one [`SensorSubsystem`]. The
//! reader and the watches share the tracker, so an accuracy event seen by
//! any listener updates what `current_accuracy` reports.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use magnetometer_core::{MagnetometerService, ServiceConfig, SimulatedSensorSubsystem};
//!
//! let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
//! let config = ServiceConfig::new().read_timeout(Duration::from_millis(50));
//! let service = MagnetometerService::with_config(sensors, config);
//!
//! assert!(service.is_available());
//! assert!(!service.is_calibration_needed());
//! assert!(service.read_once().unwrap_err().is_timeout()); // nothing emitted
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::accuracy::{AccuracyLevel, AccuracyTracker};
use crate::constants::time::ONE_SHOT_TIMEOUT_MS;
use crate::errors::SensorResult;
use crate::rate::DelayTier;
use crate::reader::SingleShotReader;
use crate::time::SystemTime;
use crate::traits::{SensorSubsystem, TimeSource};
use crate::types::{Heading, RawSample, SensorKind};
use crate::watch::{SubscriptionManager, WatchSink, WatchStream};

/// Service configuration
#[derive(Clone)]
pub struct ServiceConfig {
    /// Deadline for one-shot requests
    pub read_timeout: Duration,
    /// Delay tier one-shot requests register with
    pub one_shot_tier: DelayTier,
    /// Source of result timestamps
    pub clock: Arc<dyn TimeSource>,
}

impl ServiceConfig {
    /// Defaults: 1000 ms deadline, UI tier, system wall clock
    pub fn new() -> Self {
        Self {
            read_timeout: Duration::from_millis(ONE_SHOT_TIMEOUT_MS),
            one_shot_tier: DelayTier::Ui,
            clock: Arc::new(SystemTime),
        }
    }

    /// Set the one-shot deadline
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the tier one-shot requests register with
    pub fn one_shot_tier(mut self, tier: DelayTier) -> Self {
        self.one_shot_tier = tier;
        self
    }

    /// Set the timestamp source
    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("read_timeout", &self.read_timeout)
            .field("one_shot_tier", &self.one_shot_tier)
            .field("wall_clock", &self.clock.is_wall_clock())
            .finish()
    }
}

/// Magnetometer reading, heading and watch service
pub struct MagnetometerService {
    sensors: Arc<dyn SensorSubsystem>,
    tracker: Arc<AccuracyTracker>,
    reader: SingleShotReader,
    watches: SubscriptionManager,
}

impl MagnetometerService {
    /// Service with the default configuration
    pub fn new(sensors: Arc<dyn SensorSubsystem>) -> Self {
        Self::with_config(sensors, ServiceConfig::default())
    }

    /// Service with an explicit configuration
    pub fn with_config(sensors: Arc<dyn SensorSubsystem>, config: ServiceConfig) -> Self {
        let tracker = Arc::new(AccuracyTracker::new());
        let reader = SingleShotReader::new(
            Arc::clone(&sensors),
            Arc::clone(&tracker),
            Arc::clone(&config.clock),
            config.read_timeout,
            config.one_shot_tier,
        );
        let watches = SubscriptionManager::new(
            Arc::clone(&sensors),
            Arc::clone(&tracker),
            config.clock,
        );
        Self { sensors, tracker, reader, watches }
    }

    /// Whether the device has a magnetic-field sensor
    pub fn is_available(&self) -> bool {
        self.sensors.has_sensor(SensorKind::MagneticField)
    }

    /// Whether the device has an accelerometer (needed for headings)
    pub fn has_accelerometer(&self) -> bool {
        self.sensors.has_sensor(SensorKind::Accelerometer)
    }

    /// Next magnetometer sample
    pub fn read_once(&self) -> SensorResult<RawSample> {
        self.reader.read_once()
    }

    /// Next magnetometer sample within `timeout`
    pub fn read_once_within(&self, timeout: Duration) -> SensorResult<RawSample> {
        self.reader.read_once_within(timeout)
    }

    /// One tilt-compensated heading
    pub fn read_heading_once(&self) -> SensorResult<Heading> {
        self.reader.read_heading_once()
    }

    /// Field strength in whole microtesla
    pub fn read_field_strength(&self) -> SensorResult<i32> {
        self.reader.read_field_strength()
    }

    /// See [`SubscriptionManager::start_raw_watch`]
    pub fn start_raw_watch(&self, period_ms: i64) -> SensorResult<WatchStream<RawSample>> {
        self.watches.start_raw_watch(period_ms)
    }

    /// See [`SubscriptionManager::start_raw_watch_into`]
    pub fn start_raw_watch_into<S>(&self, sink: S, period_ms: i64) -> SensorResult<()>
    where
        S: WatchSink<RawSample> + 'static,
    {
        self.watches.start_raw_watch_into(sink, period_ms)
    }

    /// Stop the raw watch; `false` if none was active
    pub fn stop_raw_watch(&self) -> bool {
        self.watches.stop_raw_watch()
    }

    /// See [`SubscriptionManager::start_heading_watch`]
    pub fn start_heading_watch(&self, period_ms: i64) -> SensorResult<WatchStream<Heading>> {
        self.watches.start_heading_watch(period_ms)
    }

    /// See [`SubscriptionManager::start_heading_watch_filtered`]
    pub fn start_heading_watch_filtered(
        &self,
        period_ms: i64,
        filter_deg: f32,
    ) -> SensorResult<WatchStream<Heading>> {
        self.watches.start_heading_watch_filtered(period_ms, filter_deg)
    }

    /// See [`SubscriptionManager::start_heading_watch_into`]
    pub fn start_heading_watch_into<S>(
        &self,
        sink: S,
        period_ms: i64,
        filter_deg: f32,
    ) -> SensorResult<()>
    where
        S: WatchSink<Heading> + 'static,
    {
        self.watches.start_heading_watch_into(sink, period_ms, filter_deg)
    }

    /// Stop the heading watch; `false` if none was active
    pub fn stop_heading_watch(&self) -> bool {
        self.watches.stop_heading_watch()
    }

    /// Stop both watches
    pub fn reset(&self) {
        self.watches.reset();
    }

    /// Whether a raw watch is attached
    pub fn is_raw_watch_active(&self) -> bool {
        self.watches.is_raw_watch_active()
    }

    /// Whether a heading watch is attached
    pub fn is_heading_watch_active(&self) -> bool {
        self.watches.is_heading_watch_active()
    }

    /// Last-known magnetometer accuracy
    pub fn current_accuracy(&self) -> AccuracyLevel {
        self.tracker.current_accuracy()
    }

    /// True while the accuracy is below `Medium`
    pub fn is_calibration_needed(&self) -> bool {
        self.tracker.is_calibration_needed()
    }

    /// The shared accuracy tracker
    pub fn tracker(&self) -> &Arc<AccuracyTracker> {
        &self.tracker
    }

    /// The subscription manager
    pub fn watches(&self) -> &SubscriptionManager {
        &self.watches
    }

    /// The one-shot reader
    pub fn reader(&self) -> &SingleShotReader {
        &self.reader
    }
}
