//! Environment-driven configuration

use std::time::Duration;

/// Simulated delays between user input and the bot's next prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// Before the welcome prompt when a session starts
    pub start: Duration,
    /// Between any accepted input and the next prompt ("typing")
    pub thinking: Duration,
    /// Between the payment prompt and the booking confirmation
    pub confirmation: Duration,
    /// Between the booking confirmation and the reset to the welcome prompt
    pub reset: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            start: Duration::from_millis(500),
            thinking: Duration::from_millis(1000),
            confirmation: Duration::from_millis(2000),
            reset: Duration::from_millis(5000),
        }
    }
}

impl Delays {
    /// Every delay set to `delay`; handy for tests that run on real time
    #[allow(dead_code)] // Used by runtime and API tests
    pub fn uniform(delay: Duration) -> Self {
        Self {
            start: delay,
            thinking: delay,
            confirmation: delay,
            reset: delay,
        }
    }
}

const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub port: u16,
    pub delays: Delays,
    /// Sessions without user input for this long are closed
    pub session_idle: Duration,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Delays::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map_or(default, Duration::from_millis)
        };

        Self {
            port: lookup("MEDASSIST_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(8000),
            session_idle: lookup("MEDASSIST_SESSION_IDLE_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map_or(DEFAULT_SESSION_IDLE, Duration::from_secs),
            delays: Delays {
                start: millis("MEDASSIST_START_DELAY_MS", defaults.start),
                thinking: millis("MEDASSIST_THINKING_DELAY_MS", defaults.thinking),
                confirmation: millis("MEDASSIST_CONFIRMATION_DELAY_MS", defaults.confirmation),
                reset: millis("MEDASSIST_RESET_DELAY_MS", defaults.reset),
            },
        }
    }
}
