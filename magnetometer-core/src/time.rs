//! Time sources for result timestamps
//!
//! Readings and headings are stamped with wall-clock milliseconds, the unit
//! the scripting host expects. Request deadlines do not go through here;
//! they use the monotonic clock of the waiting thread.

use core::sync::atomic::{AtomicU64, Ordering};

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// System wall clock (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Settable time source for tests
///
/// Shared by reference, so the clock can be advanced while a service holds it.
#[derive(Debug, Default)]
pub struct FixedTime {
    timestamp: AtomicU64,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: AtomicU64::new(timestamp) }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.store(timestamp, Ordering::Release);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.timestamp.fetch_add(ms, Ordering::AcqRel);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.load(Ordering::Acquire)
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
