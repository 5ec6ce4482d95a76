//! Shared fixtures for the integration tests
//!
//! - a service wired to a simulated sensor subsystem and a fixed clock
//! - helpers that inject events once a request on another thread has
//!   registered its listener
//! - field vectors for a flat device facing each cardinal direction

#![allow(dead_code)]

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use magnetometer_core::time::FixedTime;
use magnetometer_core::{
    MagnetometerService, SensorKind, ServiceConfig, SimulatedSensorSubsystem,
};

/// Gravity reaction of a device lying flat, screen up (m/s²)
pub const FLAT_GRAVITY: [f32; 3] = [0.0, 0.0, 9.8];

/// Northern-hemisphere field (µT) for a flat device whose top edge points
/// north, east, south and west
pub const FACING_NORTH: [f32; 3] = [0.0, 20.0, -40.0];
pub const FACING_EAST: [f32; 3] = [-20.0, 0.0, -40.0];
pub const FACING_SOUTH: [f32; 3] = [0.0, -20.0, -40.0];
pub const FACING_WEST: [f32; 3] = [20.0, 0.0, -40.0];

/// Clock value stamped on every result
pub const FIXED_NOW_MS: u64 = 1_700_000_000_000;

/// How long helpers wait for a request to register
pub const REGISTRATION_WAIT: Duration = Duration::from_secs(2);

/// Service plus the handles tests poke at
pub struct Fixture {
    pub sensors: Arc<SimulatedSensorSubsystem>,
    pub clock: Arc<FixedTime>,
    pub service: Arc<MagnetometerService>,
}

impl Fixture {
    /// Both sensors present, default 1000 ms deadline
    pub fn new() -> Self {
        Self::build(SimulatedSensorSubsystem::with_all_sensors(), None)
    }

    /// Both sensors present, short deadline for tests that expect a timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(SimulatedSensorSubsystem::with_all_sensors(), Some(timeout))
    }

    /// Magnetometer only
    pub fn without_accelerometer(timeout: Duration) -> Self {
        Self::build(SimulatedSensorSubsystem::without_accelerometer(), Some(timeout))
    }

    /// No sensors at all
    pub fn without_sensors() -> Self {
        Self::build(SimulatedSensorSubsystem::without_sensors(), None)
    }

    fn build(sensors: SimulatedSensorSubsystem, timeout: Option<Duration>) -> Self {
        let sensors = Arc::new(sensors);
        let clock = Arc::new(FixedTime::new(FIXED_NOW_MS));

        let mut config = ServiceConfig::new().clock(clock.clone());
        if let Some(timeout) = timeout {
            config = config.read_timeout(timeout);
        }
        let service = Arc::new(MagnetometerService::with_config(sensors.clone(), config));

        Self { sensors, clock, service }
    }

    /// Run `inject` on another thread once `count` listeners exist for `kind`
    ///
    /// The handle yields `false` if the registration never happened.
    pub fn inject_after_registration<F>(
        &self,
        kind: SensorKind,
        count: usize,
        inject: F,
    ) -> JoinHandle<bool>
    where
        F: FnOnce(&SimulatedSensorSubsystem) + Send + 'static,
    {
        let sensors = Arc::clone(&self.sensors);
        thread::spawn(move || {
            if !sensors.wait_for_listeners(kind, count, REGISTRATION_WAIT) {
                return false;
            }
            inject(&sensors);
            true
        })
    }
}

/// Assert two floats are within a tolerance
#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tolerance:expr) => {
        let diff = ($actual - $expected).abs();
        if diff > $tolerance {
            panic!(
                "Value {} not within tolerance {} of expected {} (diff: {})",
                $actual, $tolerance, $expected, diff
            );
        }
    };
}
