//! Timeout helpers used across the crate.
//!
//! These centralize the default command timeout and provide a small
//! conversion helper so code and tests can express timeouts in milliseconds.

use std::time::Duration;

/// Default timeout in milliseconds for a command/response exchange.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 1000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default command timeout as Duration.
pub fn default_command_timeout() -> Duration {
    ms(DEFAULT_COMMAND_TIMEOUT_MS)
}
