//! Integration tests for one-shot reads
//!
//! Covers the latch race between data and deadline, availability checks and
//! listener cleanup on both completion paths.

#[macro_use]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use magnetometer_core::{DelayTier, SensorError, SensorKind};

use common::{Fixture, FACING_EAST, FIXED_NOW_MS, FLAT_GRAVITY};

#[test]
fn read_once_times_out_after_one_second() {
    let fixture = Fixture::new();

    let started = Instant::now();
    let err = fixture.service.read_once().unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, SensorError::Timeout { waited_ms: 1000, .. }));
    assert!(elapsed >= Duration::from_millis(1000), "returned early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1200), "returned late: {:?}", elapsed);
}

#[test]
fn timed_out_read_leaves_no_listener() {
    let fixture = Fixture::with_timeout(Duration::from_millis(30));

    assert!(fixture.service.read_once().is_err());
    assert!(fixture.service.read_field_strength().is_err());

    assert_eq!(fixture.sensors.total_registrations(), 0);
    assert_eq!(fixture.sensors.register_calls(), 2);
    assert_eq!(fixture.sensors.unregister_calls(), 2);
}

#[test]
fn read_once_returns_first_sample() {
    let fixture = Fixture::new();
    let injector = fixture.inject_after_registration(SensorKind::MagneticField, 1, |sensors| {
        sensors.emit_magnetic([3.0, 4.0, 12.0]);
        sensors.emit_magnetic([100.0, 0.0, 0.0]);
    });

    let sample = fixture.service.read_once().unwrap();
    assert!(injector.join().unwrap());

    assert_eq!((sample.x, sample.y, sample.z), (3.0, 4.0, 12.0));
    assert_eq!(sample.magnitude, 13.0);
    assert_eq!(sample.timestamp_ms, FIXED_NOW_MS);
    assert_eq!(fixture.sensors.listener_count(SensorKind::MagneticField), 0);
    assert_eq!(fixture.sensors.last_tier(SensorKind::MagneticField), None);
}

#[test]
fn one_shot_registers_at_ui_tier() {
    let fixture = Fixture::new();
    let sensors = Arc::clone(&fixture.sensors);
    let injector = fixture.inject_after_registration(SensorKind::MagneticField, 1, move |s| {
        assert_eq!(s.last_tier(SensorKind::MagneticField), Some(DelayTier::Ui));
        s.emit_magnetic([0.0, 0.0, 48.5]);
    });

    assert_eq!(fixture.service.read_field_strength().unwrap(), 49);
    assert!(injector.join().unwrap());
    assert_eq!(sensors.total_registrations(), 0);
}

#[test]
fn heading_once_waits_for_both_sensors() {
    let fixture = Fixture::new();
    let injector = fixture.inject_after_registration(SensorKind::Accelerometer, 1, |sensors| {
        sensors.emit_magnetic(FACING_EAST);
        thread::sleep(Duration::from_millis(20));
        sensors.emit_acceleration(FLAT_GRAVITY);
    });

    let heading = fixture.service.read_heading_once().unwrap();
    assert!(injector.join().unwrap());

    assert_within_tolerance!(heading.magnetic_heading_deg, 90.0, 1e-3);
    assert_eq!(heading.true_heading_deg, heading.magnetic_heading_deg);
    assert_eq!(heading.heading_accuracy, -1);
    assert_eq!(fixture.sensors.total_registrations(), 0);
}

#[test]
fn heading_once_without_accelerometer_times_out() {
    let fixture = Fixture::without_accelerometer(Duration::from_millis(100));
    let injector = fixture.inject_after_registration(SensorKind::MagneticField, 1, |sensors| {
        for _ in 0..5 {
            sensors.emit_magnetic(FACING_EAST);
        }
    });

    let err = fixture.service.read_heading_once().unwrap_err();
    assert!(injector.join().unwrap());

    assert!(err.is_timeout());
    assert_eq!(fixture.sensors.register_calls(), 1);
    assert_eq!(fixture.sensors.total_registrations(), 0);
}

#[test]
fn missing_magnetometer_fails_before_registering() {
    let fixture = Fixture::without_sensors();
    let started = Instant::now();

    assert_eq!(fixture.service.read_once().unwrap_err(), SensorError::SensorUnavailable);
    assert_eq!(fixture.service.read_heading_once().unwrap_err(), SensorError::SensorUnavailable);
    assert_eq!(
        fixture.service.read_field_strength().unwrap_err(),
        SensorError::SensorUnavailable
    );

    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(fixture.sensors.register_calls(), 0);
}

#[test]
fn read_once_within_uses_its_own_deadline() {
    let fixture = Fixture::new();
    let started = Instant::now();

    let err = fixture.service.read_once_within(Duration::from_millis(50)).unwrap_err();
    assert!(matches!(err, SensorError::Timeout { waited_ms: 50, .. }));
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn concurrent_reads_each_get_a_sample() {
    let fixture = Fixture::new();
    let injector = fixture.inject_after_registration(SensorKind::MagneticField, 2, |sensors| {
        sensors.emit_magnetic([1.0, 2.0, 2.0]);
    });

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&fixture.service);
            thread::spawn(move || service.read_once())
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap().unwrap().magnitude, 3.0);
    }
    assert!(injector.join().unwrap());
    assert_eq!(fixture.sensors.total_registrations(), 0);
}
