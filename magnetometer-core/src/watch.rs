//! Continuous subscriptions
//!
//! The manager has two independent slots, one for raw readings and one for
//! headings. Each slot holds at most one watch; starting a watch detaches
//! whatever the slot held before and then attaches the new one, under the
//! slot's mutex so the swap is atomic with respect to other starts and stops.
//!
//! ## Detaching
//!
//! Every watch has a gate: a mutex over its `attached` flag that the
//! listener holds from the flag check through the sink's `deliver`.
//! Detaching takes the gate, clears the flag and only then unregisters, so
//! a delivery in progress completes before `start_*`/`stop_*` returns and a
//! superseded sink receives nothing afterwards. A sink must therefore not
//! start or stop watches from inside `deliver`.
//!
//! Once the subsystem releases the listener the sink is dropped, which ends a
//! [`WatchStream`].
//!
//! ## Heading buffer
//!
//! The latest magnetic and acceleration vectors are kept by the manager, not
//! by a single watch, and survive restarts of the heading watch. A restarted
//! watch can therefore deliver as soon as either sensor reports.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::accuracy::AccuracyTracker;
use crate::errors::{SensorError, SensorResult};
use crate::fusion::FusionBuffer;
use crate::math;
use crate::rate::delay_tier;
use crate::traits::{ListenerId, SensorListener, SensorSubsystem, TimeSource};
use crate::types::{Heading, RawSample, SensorEvent, SensorKind};

/// Destination of a watch's deliveries
pub trait WatchSink<T>: Send + Sync {
    /// Hand over one item; `false` if the receiving side is gone
    fn deliver(&self, item: T) -> bool;
}

impl<T: Send> WatchSink<T> for Sender<T> {
    fn deliver(&self, item: T) -> bool {
        self.send(item).is_ok()
    }
}

/// Receiving end of a watch started without an explicit sink
///
/// Iterating blocks until the next delivery and ends once the watch is
/// stopped or superseded.
#[derive(Debug)]
pub struct WatchStream<T> {
    rx: Receiver<T>,
    // item taken off the channel by `is_closed`, handed out first
    peeked: RefCell<Option<T>>,
}

impl<T> WatchStream<T> {
    fn channel() -> (Sender<T>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx, peeked: RefCell::new(None) })
    }

    /// Wait up to `timeout` for the next item
    ///
    /// `None` on timeout and once the watch has ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        if let Some(item) = self.peeked.take() {
            return Some(item);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Next item if one is already queued
    pub fn try_next(&self) -> Option<T> {
        self.peeked.take().or_else(|| self.rx.try_recv().ok())
    }

    /// True once the watch has ended and every queued item was consumed
    ///
    /// Does not consume: a queued item stays available to the next read.
    pub fn is_closed(&self) -> bool {
        if self.peeked.borrow().is_some() {
            return false;
        }
        match self.rx.try_recv() {
            Ok(item) => {
                *self.peeked.borrow_mut() = Some(item);
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => true,
        }
    }
}

impl<T> Iterator for WatchStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.peeked.get_mut().take().or_else(|| self.rx.recv().ok())
    }
}

/// `attached` flag of one watch, held for the whole of a delivery
type Gate = Arc<Mutex<bool>>;

fn open(gate: &Gate) -> MutexGuard<'_, bool> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

struct RawWatchListener {
    sink: Box<dyn WatchSink<RawSample>>,
    attached: Gate,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
}

impl SensorListener for RawWatchListener {
    fn on_event(&self, event: &SensorEvent) {
        let attached = open(&self.attached);
        if !*attached {
            return;
        }
        match *event {
            SensorEvent::Data { kind: SensorKind::MagneticField, values, .. } => {
                let sample = RawSample::from_values(values, self.clock.now());
                if !self.sink.deliver(sample) {
                    log_trace!("raw watch receiver gone, sample dropped");
                }
            }
            SensorEvent::Accuracy { kind, level } => {
                self.tracker.on_accuracy_changed(kind, level);
            }
            SensorEvent::Data { .. } => {}
        }
    }
}

struct HeadingWatchListener {
    sink: Box<dyn WatchSink<Heading>>,
    attached: Gate,
    buffer: Arc<Mutex<FusionBuffer>>,
    filter_deg: f32,
    last_delivered: Mutex<Option<f32>>,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
}

impl HeadingWatchListener {
    fn passes_filter(&self, degrees: f32) -> bool {
        let mut last = self.last_delivered.lock().unwrap_or_else(PoisonError::into_inner);
        let passes = match *last {
            Some(previous) if self.filter_deg > 0.0 => {
                math::angular_distance(degrees, previous) >= self.filter_deg
            }
            _ => true,
        };
        if passes {
            *last = Some(degrees);
        }
        passes
    }
}

impl SensorListener for HeadingWatchListener {
    fn on_event(&self, event: &SensorEvent) {
        let attached = open(&self.attached);
        if !*attached {
            return;
        }
        match *event {
            SensorEvent::Data { kind, values, .. } => {
                let pair = self
                    .buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update(kind, values);
                let Some((mag, accel)) = pair else {
                    return;
                };

                let heading = math::heading(mag, accel, self.clock.now());
                if !self.passes_filter(heading.magnetic_heading_deg) {
                    return;
                }
                log_trace!("heading {:.1}", heading.magnetic_heading_deg);
                if !self.sink.deliver(heading) {
                    log_trace!("heading watch receiver gone, heading dropped");
                }
            }
            SensorEvent::Accuracy { kind, level } => {
                self.tracker.on_accuracy_changed(kind, level);
            }
        }
    }
}

#[derive(Debug)]
struct ActiveWatch {
    id: ListenerId,
    attached: Gate,
    period_ms: i64,
}

type Slot = Mutex<Option<ActiveWatch>>;

/// Owner of the raw-reading and heading watch slots
pub struct SubscriptionManager {
    sensors: Arc<dyn SensorSubsystem>,
    tracker: Arc<AccuracyTracker>,
    clock: Arc<dyn TimeSource>,
    raw: Slot,
    heading: Slot,
    heading_buffer: Arc<Mutex<FusionBuffer>>,
}

impl SubscriptionManager {
    /// Manager with both slots empty
    pub fn new(
        sensors: Arc<dyn SensorSubsystem>,
        tracker: Arc<AccuracyTracker>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            sensors,
            tracker,
            clock,
            raw: Mutex::new(None),
            heading: Mutex::new(None),
            heading_buffer: Arc::new(Mutex::new(FusionBuffer::new())),
        }
    }

    /// Start streaming magnetometer samples, replacing any raw watch
    pub fn start_raw_watch(&self, period_ms: i64) -> SensorResult<WatchStream<RawSample>> {
        let (tx, stream) = WatchStream::channel();
        self.start_raw_watch_into(tx, period_ms)?;
        Ok(stream)
    }

    /// Like [`start_raw_watch`](Self::start_raw_watch), delivering to `sink`
    pub fn start_raw_watch_into<S>(&self, sink: S, period_ms: i64) -> SensorResult<()>
    where
        S: WatchSink<RawSample> + 'static,
    {
        self.ensure_available()?;

        let mut slot = lock(&self.raw);
        self.detach(&mut slot, Some(SensorKind::MagneticField), "raw");

        let attached: Gate = Arc::new(Mutex::new(true));
        let listener = Arc::new(RawWatchListener {
            sink: Box::new(sink),
            attached: Arc::clone(&attached),
            tracker: Arc::clone(&self.tracker),
            clock: Arc::clone(&self.clock),
        });

        let id = ListenerId::next();
        self.register(id, listener, SensorKind::MagneticField, period_ms);
        log_debug!("raw watch {:?} started, period {} ms", id, period_ms);

        *slot = Some(ActiveWatch { id, attached, period_ms });
        Ok(())
    }

    /// Stop the raw watch; returns whether one was active
    pub fn stop_raw_watch(&self) -> bool {
        let mut slot = lock(&self.raw);
        self.detach(&mut slot, Some(SensorKind::MagneticField), "raw")
    }

    /// Start streaming headings, replacing any heading watch
    pub fn start_heading_watch(&self, period_ms: i64) -> SensorResult<WatchStream<Heading>> {
        self.start_heading_watch_filtered(period_ms, 0.0)
    }

    /// Start streaming headings that moved at least `filter_deg` since the
    /// last delivered one
    pub fn start_heading_watch_filtered(
        &self,
        period_ms: i64,
        filter_deg: f32,
    ) -> SensorResult<WatchStream<Heading>> {
        let (tx, stream) = WatchStream::channel();
        self.start_heading_watch_into(tx, period_ms, filter_deg)?;
        Ok(stream)
    }

    /// Like [`start_heading_watch_filtered`](Self::start_heading_watch_filtered),
    /// delivering to `sink`
    pub fn start_heading_watch_into<S>(
        &self,
        sink: S,
        period_ms: i64,
        filter_deg: f32,
    ) -> SensorResult<()>
    where
        S: WatchSink<Heading> + 'static,
    {
        self.ensure_available()?;

        let mut slot = lock(&self.heading);
        self.detach(&mut slot, None, "heading");

        let attached: Gate = Arc::new(Mutex::new(true));
        let listener: Arc<dyn SensorListener> = Arc::new(HeadingWatchListener {
            sink: Box::new(sink),
            attached: Arc::clone(&attached),
            buffer: Arc::clone(&self.heading_buffer),
            filter_deg: if filter_deg.is_finite() { filter_deg.max(0.0) } else { 0.0 },
            last_delivered: Mutex::new(None),
            tracker: Arc::clone(&self.tracker),
            clock: Arc::clone(&self.clock),
        });

        let id = ListenerId::next();
        self.register(id, Arc::clone(&listener), SensorKind::MagneticField, period_ms);
        if self.sensors.has_sensor(SensorKind::Accelerometer) {
            self.register(id, listener, SensorKind::Accelerometer, period_ms);
        } else {
            log_warn!("no accelerometer, heading watch {:?} will stay silent", id);
        }
        log_debug!(
            "heading watch {:?} started, period {} ms, filter {} deg",
            id,
            period_ms,
            filter_deg
        );

        *slot = Some(ActiveWatch { id, attached, period_ms });
        Ok(())
    }

    /// Stop the heading watch; returns whether one was active
    pub fn stop_heading_watch(&self) -> bool {
        let mut slot = lock(&self.heading);
        self.detach(&mut slot, None, "heading")
    }

    /// Stop both watches
    pub fn reset(&self) {
        let raw = self.stop_raw_watch();
        let heading = self.stop_heading_watch();
        if raw || heading {
            log_debug!("watches reset (raw: {}, heading: {})", raw, heading);
        }
    }

    /// Whether a raw watch is attached
    pub fn is_raw_watch_active(&self) -> bool {
        lock(&self.raw).is_some()
    }

    /// Whether a heading watch is attached
    pub fn is_heading_watch_active(&self) -> bool {
        lock(&self.heading).is_some()
    }

    /// Sampling period requested by the active raw watch
    pub fn raw_watch_period_ms(&self) -> Option<i64> {
        lock(&self.raw).as_ref().map(|w| w.period_ms)
    }

    /// Sampling period requested by the active heading watch
    pub fn heading_watch_period_ms(&self) -> Option<i64> {
        lock(&self.heading).as_ref().map(|w| w.period_ms)
    }

    fn ensure_available(&self) -> SensorResult<()> {
        if self.sensors.has_sensor(SensorKind::MagneticField) {
            Ok(())
        } else {
            Err(SensorError::SensorUnavailable)
        }
    }

    fn register(
        &self,
        id: ListenerId,
        listener: Arc<dyn SensorListener>,
        kind: SensorKind,
        period_ms: i64,
    ) {
        if !self.sensors.register_listener(id, listener, kind, delay_tier(period_ms)) {
            log_warn!("registration of {:?} for {:?} refused", id, kind);
        }
    }

    // Waits out a delivery holding the gate; none starts once the flag is clear
    fn detach(
        &self,
        slot: &mut Option<ActiveWatch>,
        kind: Option<SensorKind>,
        _label: &str,
    ) -> bool {
        match slot.take() {
            Some(watch) => {
                *open(&watch.attached) = false;
                self.sensors.unregister_listener(watch.id, kind);
                log_debug!("{} watch {:?} detached", _label, watch.id);
                true
            }
            None => false,
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.reset();
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<ActiveWatch>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::DelayTier;
    use crate::simulated::SimulatedSensorSubsystem;
    use crate::time::{FixedTime, Timestamp};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    const WAIT: Duration = Duration::from_millis(200);

    /// Clock whose first reading parks the caller until released
    struct ParkingClock {
        armed: AtomicBool,
        entered: Barrier,
        release: Barrier,
    }

    impl ParkingClock {
        fn new() -> Self {
            Self { armed: AtomicBool::new(true), entered: Barrier::new(2), release: Barrier::new(2) }
        }
    }

    impl TimeSource for ParkingClock {
        fn now(&self) -> Timestamp {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.wait();
                self.release.wait();
            }
            7
        }

        fn is_wall_clock(&self) -> bool {
            false
        }
    }

    /// Counts deliveries, and those that arrive after `stopped` is set
    struct StopAwareSink {
        stopped: Arc<AtomicBool>,
        delivered: Arc<AtomicUsize>,
        late: Arc<AtomicUsize>,
    }

    impl WatchSink<RawSample> for StopAwareSink {
        fn deliver(&self, _sample: RawSample) -> bool {
            if self.stopped.load(Ordering::SeqCst) {
                self.late.fetch_add(1, Ordering::SeqCst);
            }
            self.delivered.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn manager(sensors: &Arc<SimulatedSensorSubsystem>) -> SubscriptionManager {
        SubscriptionManager::new(
            sensors.clone(),
            Arc::new(AccuracyTracker::new()),
            Arc::new(FixedTime::new(1_000)),
        )
    }

    #[test]
    fn raw_watch_delivers_until_stopped() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        let watches = manager(&sensors);

        let stream = watches.start_raw_watch(100).unwrap();
        assert_eq!(sensors.last_tier(SensorKind::MagneticField), Some(DelayTier::Ui));

        sensors.emit_magnetic([3.0, 4.0, 0.0]);
        let sample = stream.recv_timeout(WAIT).unwrap();
        assert_eq!(sample.magnitude, 5.0);
        assert_eq!(sample.timestamp_ms, 1_000);

        assert!(watches.stop_raw_watch());
        assert_eq!(sensors.listener_count(SensorKind::MagneticField), 0);
        assert!(stream.is_closed());
    }

    #[test]
    fn is_closed_keeps_queued_sample() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        let watches = manager(&sensors);
        let mut stream = watches.start_raw_watch(100).unwrap();

        sensors.emit_magnetic([3.0, 4.0, 0.0]);
        sensors.emit_magnetic([0.0, 6.0, 8.0]);
        assert!(!stream.is_closed());
        assert!(!stream.is_closed());
        assert_eq!(stream.try_next().unwrap().magnitude, 5.0);

        assert!(watches.stop_raw_watch());
        assert!(!stream.is_closed());
        assert_eq!(stream.next().unwrap().magnitude, 10.0);
        assert!(stream.is_closed());
        assert!(stream.next().is_none());
    }

    #[test]
    fn stop_waits_for_delivery_in_progress() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        let clock = Arc::new(ParkingClock::new());
        let watches = Arc::new(SubscriptionManager::new(
            sensors.clone(),
            Arc::new(AccuracyTracker::new()),
            clock.clone(),
        ));

        let stopped = Arc::new(AtomicBool::new(false));
        let delivered = Arc::new(AtomicUsize::new(0));
        let late = Arc::new(AtomicUsize::new(0));
        let sink = StopAwareSink {
            stopped: Arc::clone(&stopped),
            delivered: Arc::clone(&delivered),
            late: Arc::clone(&late),
        };
        watches.start_raw_watch_into(sink, 100).unwrap();

        let emitter = {
            let sensors = Arc::clone(&sensors);
            thread::spawn(move || sensors.emit_magnetic([3.0, 4.0, 0.0]))
        };
        // emitter is now between the attached check and the sink
        clock.entered.wait();

        let stopper = {
            let watches = Arc::clone(&watches);
            let stopped = Arc::clone(&stopped);
            thread::spawn(move || {
                let was_active = watches.stop_raw_watch();
                stopped.store(true, Ordering::SeqCst);
                was_active
            })
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!stopped.load(Ordering::SeqCst), "stop returned during a delivery");

        clock.release.wait();
        assert!(stopper.join().unwrap());
        emitter.join().unwrap();

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        assert_eq!(late.load(Ordering::SeqCst), 0);

        sensors.emit_magnetic([3.0, 4.0, 0.0]);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_without_watch_is_a_no_op() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        let watches = manager(&sensors);

        assert!(!watches.stop_raw_watch());
        assert!(!watches.stop_heading_watch());
        assert_eq!(sensors.register_calls(), 0);
        assert_eq!(sensors.unregister_calls(), 0);
    }

    #[test]
    fn heading_filter_suppresses_small_changes() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        let watches = manager(&sensors);
        let stream = watches.start_heading_watch_filtered(100, 10.0).unwrap();

        sensors.emit_acceleration([0.0, 0.0, 9.8]);
        sensors.emit_magnetic([0.0, 20.0, -40.0]); // 0°
        assert!(stream.recv_timeout(WAIT).is_some());

        sensors.emit_magnetic([-1.0, 20.0, -40.0]); // about 3°
        assert!(stream.try_next().is_none());

        sensors.emit_magnetic([-20.0, 0.0, -40.0]); // 90°
        let heading = stream.recv_timeout(WAIT).unwrap();
        assert!((heading.magnetic_heading_deg - 90.0).abs() < 1e-3);
    }

    #[test]
    fn heading_watch_without_magnetometer_fails() {
        let sensors = Arc::new(SimulatedSensorSubsystem::without_sensors());
        let watches = manager(&sensors);

        assert_eq!(
            watches.start_heading_watch(100).unwrap_err(),
            SensorError::SensorUnavailable
        );
        assert!(!watches.is_heading_watch_active());
        assert_eq!(sensors.register_calls(), 0);
    }

    #[test]
    fn drop_releases_registrations() {
        let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
        {
            let watches = manager(&sensors);
            let _raw = watches.start_raw_watch(20).unwrap();
            let _heading = watches.start_heading_watch(20).unwrap();
            assert_eq!(sensors.total_registrations(), 3);
        }
        assert_eq!(sensors.total_registrations(), 0);
    }
}
