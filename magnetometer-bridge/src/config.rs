//! Bridge configuration

use std::time::Duration;

use magnetometer_core::constants::{
    DEFAULT_WATCH_PERIOD_MS, INFO_READ_TIMEOUT_MS, PLATFORM_NAME,
};

/// Bridge configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Platform name reported by `getMagnetometerInfo`
    pub platform: String,
    /// Deadline for the best-effort reading inside `getMagnetometerInfo`
    pub info_timeout: Duration,
    /// Watch period used when the host passes none (ms)
    pub default_period_ms: i64,
    /// Heading filter used when the host passes none (degrees)
    pub default_filter_deg: f32,
}

impl BridgeConfig {
    /// Defaults matching the host API documentation
    pub fn new() -> Self {
        Self {
            platform: PLATFORM_NAME.to_string(),
            info_timeout: Duration::from_millis(INFO_READ_TIMEOUT_MS),
            default_period_ms: DEFAULT_WATCH_PERIOD_MS,
            default_filter_deg: 0.0,
        }
    }

    /// Set the reported platform name
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Set the info reading deadline in milliseconds
    pub fn info_timeout_ms(mut self, ms: u64) -> Self {
        self.info_timeout = Duration::from_millis(ms);
        self
    }

    /// Set the default watch period
    pub fn default_period_ms(mut self, period_ms: i64) -> Self {
        self.default_period_ms = period_ms;
        self
    }

    /// Set the default heading filter
    pub fn default_filter_deg(mut self, filter_deg: f32) -> Self {
        self.default_filter_deg = filter_deg;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
