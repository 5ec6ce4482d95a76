//! Drive the bridge the way a scripting host would, against a simulated device
//!
//! A background thread turns the simulated device slowly clockwise while
//! the "host" issues JSON requests and prints every reply line.
//!
//! Run with: `cargo run -p magnetometer-bridge --example simulated_host`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use magnetometer_bridge::{codec, Bridge, BridgeConfig};
use magnetometer_core::{MagnetometerService, SimulatedSensorSubsystem};
use tokio::sync::mpsc::unbounded_channel;

const REQUESTS: &[&str] = &[
    r#"{"id":"1","action":"isAvailable"}"#,
    r#"{"id":"2","action":"getMagnetometerInfo"}"#,
    r#"{"id":"3","action":"getHeading"}"#,
    r#"{"id":"4","action":"watchHeading","args":[50,15]}"#,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sensors = Arc::new(SimulatedSensorSubsystem::with_all_sensors());
    let bridge = Bridge::new(Arc::new(MagnetometerService::new(sensors.clone())), BridgeConfig::new());

    let running = Arc::new(AtomicBool::new(true));
    let device = {
        let sensors = Arc::clone(&sensors);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut yaw_deg = 0.0f32;
            while running.load(Ordering::Relaxed) {
                let (s, c) = (yaw_deg.to_radians().sin(), yaw_deg.to_radians().cos());
                sensors.emit_acceleration([0.0, 0.0, 9.81]);
                sensors.emit_magnetic([-20.0 * s, 20.0 * c, -40.0]);
                yaw_deg = (yaw_deg + 3.0) % 360.0;
                thread::sleep(Duration::from_millis(20));
            }
        })
    };

    let (tx, mut rx) = unbounded_channel();
    for line in REQUESTS {
        println!("> {}", line);
        bridge.execute_json(line, tx.clone()).await?;
    }
    drop(tx);

    let printer = tokio::spawn(async move {
        while let Some(reply) = rx.recv().await {
            match codec::encode_reply(&reply) {
                Ok(line) => println!("< {}", line),
                Err(e) => eprintln!("encode failed: {}", e),
            }
        }
    });

    tokio::time::sleep(Duration::from_secs(2)).await;
    bridge.reset();
    printer.await?;

    running.store(false, Ordering::Relaxed);
    device.join().map_err(|_| "device thread panicked")?;
    Ok(())
}
