//! Property tests for the vector math and the sampling policy

use proptest::prelude::*;

use magnetometer_core::math::{angular_distance, normalize_degrees};
use magnetometer_core::{delay_tier, heading, magnitude, try_azimuth, DelayTier, Vector3};

fn rotate_z(v: Vector3, radians: f32) -> Vector3 {
    let (s, c) = (radians.sin(), radians.cos());
    Vector3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z)
}

fn rotate_x(v: Vector3, radians: f32) -> Vector3 {
    let (s, c) = (radians.sin(), radians.cos());
    Vector3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z)
}

proptest! {
    #[test]
    fn magnitude_is_euclidean_norm(x in -200.0f32..200.0, y in -200.0f32..200.0, z in -200.0f32..200.0) {
        let expected = ((x as f64).powi(2) + (y as f64).powi(2) + (z as f64).powi(2)).sqrt();
        let actual = magnitude(x, y, z) as f64;
        prop_assert!((actual - expected).abs() <= expected * 1e-5 + 1e-4);
    }

    #[test]
    fn magnitude_is_rotation_invariant(
        x in -100.0f32..100.0,
        y in -100.0f32..100.0,
        z in -100.0f32..100.0,
        yaw in 0.0f32..6.28,
        pitch in 0.0f32..6.28,
    ) {
        let v = Vector3::new(x, y, z);
        let rotated = rotate_x(rotate_z(v, yaw), pitch);
        prop_assert!((rotated.norm() - v.norm()).abs() < 1e-2);
    }

    #[test]
    fn heading_is_in_range(
        mx in -60.0f32..60.0,
        my in -60.0f32..60.0,
        mz in -60.0f32..60.0,
        ax in -12.0f32..12.0,
        ay in -12.0f32..12.0,
        az in -12.0f32..12.0,
    ) {
        let h = heading(Vector3::new(mx, my, mz), Vector3::new(ax, ay, az), 0);
        prop_assert!(h.magnetic_heading_deg >= 0.0);
        prop_assert!(h.magnetic_heading_deg < 360.0);
        prop_assert_eq!(h.true_heading_deg, h.magnetic_heading_deg);
        prop_assert_eq!(h.heading_accuracy, -1);
    }

    #[test]
    fn turning_the_device_turns_the_heading(yaw_deg in 0.0f32..360.0) {
        // Turning a flat device clockwise turns the field counter-clockwise
        // in the device frame, i.e. a positive rotation about z
        let field = Vector3::new(0.0, 20.0, -40.0);
        let rotated = rotate_z(field, yaw_deg.to_radians());
        let azimuth = try_azimuth(rotated, Vector3::new(0.0, 0.0, 9.81)).unwrap();
        prop_assert!(angular_distance(azimuth, yaw_deg) < 0.05);
    }

    #[test]
    fn normalize_stays_in_range(degrees in -10_000.0f32..10_000.0) {
        let n = normalize_degrees(degrees);
        prop_assert!((0.0..360.0).contains(&n));
    }

    #[test]
    fn delay_tier_is_monotonic(a in -1_000i64..1_000, b in -1_000i64..1_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(delay_tier(lo) <= delay_tier(hi));
    }
}

#[test]
fn delay_tier_boundaries() {
    let cases = [
        (20, DelayTier::Fastest),
        (21, DelayTier::Game),
        (60, DelayTier::Game),
        (61, DelayTier::Ui),
        (200, DelayTier::Ui),
        (201, DelayTier::Normal),
    ];
    for (period, tier) in cases {
        assert_eq!(delay_tier(period), tier, "period {}", period);
    }
}
