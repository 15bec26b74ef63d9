use std::fmt;
use std::time::Duration;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;

/// Tick interval at the slowest speed.
pub const BASE_TICK_INTERVAL_MS: u64 = 200;

/// Milliseconds shaved off the tick interval per speed step.
pub const TICK_STEP_MS: u64 = 20;

/// Player-selected game speed, always within `MIN_SPEED..=MAX_SPEED`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Speed(u8);

impl Speed {
    pub const SLOWEST: Self = Self(MIN_SPEED);

    /// Creates a speed, clamping `level` into the valid range.
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self(level.clamp(MIN_SPEED, MAX_SPEED))
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    /// One step faster; saturates at the top speed.
    #[must_use]
    pub fn faster(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One step slower; saturates at the bottom speed.
    #[must_use]
    pub fn slower(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// Input-wait timeout for one tick: `200 - (speed - 1) * 20` ms.
    #[must_use]
    pub fn tick_interval(self) -> Duration {
        let penalty_ms = u64::from(self.0 - MIN_SPEED) * TICK_STEP_MS;
        Duration::from_millis(BASE_TICK_INTERVAL_MS - penalty_ms)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::SLOWEST
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
