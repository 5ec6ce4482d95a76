//! Shared fixtures for the bridge integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use magnetometer_bridge::{Bridge, BridgeConfig, Reply};
use magnetometer_core::time::FixedTime;
use magnetometer_core::{MagnetometerService, SensorKind, ServiceConfig, SimulatedSensorSubsystem};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub const FLAT_GRAVITY: [f32; 3] = [0.0, 0.0, 9.8];
pub const FACING_EAST: [f32; 3] = [-20.0, 0.0, -40.0];
pub const FIXED_NOW_MS: u64 = 1_700_000_000_000;

/// Bridge over a simulated device
pub struct BridgeFixture {
    pub sensors: Arc<SimulatedSensorSubsystem>,
    pub bridge: Bridge,
}

impl BridgeFixture {
    /// Both sensors, short one-shot and info deadlines
    pub fn new() -> Self {
        Self::build(SimulatedSensorSubsystem::with_all_sensors())
    }

    /// No magnetometer
    pub fn without_sensors() -> Self {
        Self::build(SimulatedSensorSubsystem::without_sensors())
    }

    fn build(sensors: SimulatedSensorSubsystem) -> Self {
        let sensors = Arc::new(sensors);
        let config = ServiceConfig::new()
            .read_timeout(Duration::from_millis(150))
            .clock(Arc::new(FixedTime::new(FIXED_NOW_MS)));
        let service = MagnetometerService::with_config(sensors.clone(), config);
        let bridge = Bridge::new(Arc::new(service), BridgeConfig::new().info_timeout_ms(100));
        Self { sensors, bridge }
    }

    /// Emit on another thread once `kind` has a listener
    pub fn inject_after_registration<F>(&self, kind: SensorKind, inject: F) -> JoinHandle<bool>
    where
        F: FnOnce(&SimulatedSensorSubsystem) + Send + 'static,
    {
        let sensors = Arc::clone(&self.sensors);
        thread::spawn(move || {
            if !sensors.wait_for_listeners(kind, 1, Duration::from_secs(2)) {
                return false;
            }
            inject(&sensors);
            true
        })
    }
}

/// Reply channel for one test
pub fn replies() -> (UnboundedSender<Reply>, UnboundedReceiver<Reply>) {
    unbounded_channel()
}
