//! Compass walk: one-shot reads and a heading watch on a simulated device
//!
//! The device sits flat and turns a quarter turn at a time. Each position
//! is read once, then a filtered heading watch follows a full rotation.
//!
//! Run with: `cargo run -p magnetometer-core --example compass_walk`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use magnetometer_core::{MagnetometerService, SensorKind, SimulatedSensorSubsystem};

const GRAVITY: [f32; 3] = [0.0, 0.0, 9.81];

// Horizontal 20 µT, vertical 40 µT downwards
fn field_at(yaw_deg: f32) -> [f32; 3] {
    let (s, c) = (yaw_deg.to_radians().sin(), yaw_deg.to_radians().cos());
    [-20.0 * s, 20.0 * c, -40.0]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
    let service = MagnetometerService::new(sensors.clone());

    println!("=== One-shot headings ===");
    for yaw in [0.0f32, 90.0, 180.0, 270.0] {
        let device = Arc::clone(&sensors);
        let emitter = thread::spawn(move || {
            if device.wait_for_listeners(SensorKind::Accelerometer, 1, Duration::from_secs(1)) {
                device.emit_acceleration(GRAVITY);
                device.emit_magnetic(field_at(yaw));
            }
        });

        let heading = service.read_heading_once()?;
        emitter.join().map_err(|_| "emitter panicked")?;
        println!("device at {:>5.1}° -> heading {:>5.1}°", yaw, heading.magnetic_heading_deg);
    }

    println!("\n=== Heading watch, 20° filter ===");
    let headings = service.start_heading_watch_filtered(50, 20.0)?;
    sensors.emit_acceleration(GRAVITY);
    for step in 0..=72 {
        sensors.emit_magnetic(field_at(step as f32 * 5.0));
    }
    service.stop_heading_watch();

    for heading in headings {
        println!("heading {:>5.1}°", heading.magnetic_heading_deg);
    }
    Ok(())
}
