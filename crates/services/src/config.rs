use std::env;
use std::time::Duration;

pub const DEFAULT_TIME_BUDGET_SECS: u32 = 600;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Timing knobs for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown budget in seconds.
    pub time_budget_secs: u32,
    /// Wall-clock length of one countdown second. Shortened in tests and demos.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: DEFAULT_TIME_BUDGET_SECS,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl SessionConfig {
    /// Read `QUIZ_TIME_BUDGET_SECS` and `QUIZ_TICK_INTERVAL_MS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let time_budget_secs = env::var("QUIZ_TIME_BUDGET_SECS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_TIME_BUDGET_SECS);
        let tick_interval = env::var("QUIZ_TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map_or(
                Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
                Duration::from_millis,
            );
        Self {
            time_budget_secs,
            tick_interval,
        }
    }

    #[must_use]
    pub fn with_time_budget(mut self, secs: u32) -> Self {
        self.time_budget_secs = secs;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ten_minute_sprint() {
        let config = SessionConfig::default();
        assert_eq!(config.time_budget_secs, 600);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn builders_override_fields() {
        let config = SessionConfig::default()
            .with_time_budget(30)
            .with_tick_interval(Duration::from_millis(10));
        assert_eq!(config.time_budget_secs, 30);
        assert_eq!(config.tick_interval, Duration::from_millis(10));
    }
}
