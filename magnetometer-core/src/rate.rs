//! Sampling rate policy
//!
//! Hosts ask for a sampling period in milliseconds; the platform only
//! understands four coarse delay tiers. The tier is a hint about acceptable
//! latency, not a guaranteed period.

use crate::constants::time::{
    FASTEST_TIER_MAX_PERIOD_MS, GAME_TIER_MAX_PERIOD_MS, UI_TIER_MAX_PERIOD_MS,
};

/// Platform sensor delay tier, fastest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DelayTier {
    /// As fast as the hardware allows
    Fastest,
    /// Suitable for games (~50 Hz)
    Game,
    /// Suitable for UI updates (~15 Hz)
    Ui,
    /// Screen orientation changes (~5 Hz)
    Normal,
}

/// Map a requested period to a delay tier
///
/// Total: zero and negative periods select `Fastest`.
pub fn delay_tier(period_ms: i64) -> DelayTier {
    if period_ms <= FASTEST_TIER_MAX_PERIOD_MS {
        DelayTier::Fastest
    } else if period_ms <= GAME_TIER_MAX_PERIOD_MS {
        DelayTier::Game
    } else if period_ms <= UI_TIER_MAX_PERIOD_MS {
        DelayTier::Ui
    } else {
        DelayTier::Normal
    }
}
