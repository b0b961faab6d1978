use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and retry bounds for automated login.
///
/// The sequencer has no way to observe the game's login screen, so these
/// values are all it has to tolerate slow client start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Wait after starting the game before the first attempt (default: 8s)
    pub warm_up_ms: u64,

    /// Pause at the start of every attempt (default: 500ms)
    pub attempt_pause_ms: u64,

    /// Maximum number of attempts before giving up (default: 40)
    pub max_attempts: u32,

    /// How many times each field is clicked and cleared before typing
    pub clear_repetitions: u32,

    pub click_settle_ms: u64,
    pub key_settle_ms: u64,

    /// Delay after each typed character (default: 50ms)
    pub char_delay_ms: u64,

    /// Pause after a field has been typed (default: 500ms)
    pub field_settle_ms: u64,

    /// Backoff after a failed attempt (default: 1s)
    pub retry_backoff_ms: u64,

    /// Time the operator gets to position the pointer during capture (default: 3s)
    pub capture_delay_ms: u64,

    /// Duration of each animated pointer move when testing coordinates
    pub test_move_ms: u64,

    /// Pause on each point when testing coordinates
    pub test_pause_ms: u64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            warm_up_ms: 8000,
            attempt_pause_ms: 500,
            max_attempts: 40,
            clear_repetitions: 3,
            click_settle_ms: 300,
            key_settle_ms: 100,
            char_delay_ms: 50,
            field_settle_ms: 500,
            retry_backoff_ms: 1000,
            capture_delay_ms: 3000,
            test_move_ms: 500,
            test_pause_ms: 1000,
        }
    }
}

impl AutomationConfig {
    /// Same attempt bound and repetitions, but without any delays
    pub fn immediate() -> Self {
        Self {
            warm_up_ms: 0,
            attempt_pause_ms: 0,
            click_settle_ms: 0,
            key_settle_ms: 0,
            char_delay_ms: 0,
            field_settle_ms: 0,
            retry_backoff_ms: 0,
            capture_delay_ms: 0,
            test_move_ms: 0,
            test_pause_ms: 0,
            ..Self::default()
        }
    }

    pub fn warm_up(&self) -> Duration {
        Duration::from_millis(self.warm_up_ms)
    }

    pub fn attempt_pause(&self) -> Duration {
        Duration::from_millis(self.attempt_pause_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn key_settle(&self) -> Duration {
        Duration::from_millis(self.key_settle_ms)
    }

    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.char_delay_ms)
    }

    pub fn field_settle(&self) -> Duration {
        Duration::from_millis(self.field_settle_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }

    pub fn test_move(&self) -> Duration {
        Duration::from_millis(self.test_move_ms)
    }

    pub fn test_pause(&self) -> Duration {
        Duration::from_millis(self.test_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_timings() {
        let config = AutomationConfig::default();
        assert_eq!(config.warm_up(), Duration::from_secs(8));
        assert_eq!(config.max_attempts, 40);
        assert_eq!(config.retry_backoff(), Duration::from_secs(1));
        assert_eq!(config.capture_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_immediate_keeps_bounds() {
        let config = AutomationConfig::immediate();
        assert_eq!(config.max_attempts, 40);
        assert_eq!(config.clear_repetitions, 3);
        assert_eq!(config.warm_up(), Duration::ZERO);
        assert_eq!(config.char_delay(), Duration::ZERO);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AutomationConfig = toml::from_str("max_attempts = 5\n").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.warm_up_ms, 8000);
    }
}
