// pn532-ndef/src/diag.rs

//! Diagnostics capability injected into every component.
//!
//! Components never talk to a global logger directly; they hold an
//! `Arc<dyn DiagSink>` and report through it. The default `LogSink`
//! forwards to the `log` facade (silent unless a logger is installed),
//! while `MemorySink` records entries so tests can assert on emitted
//! diagnostics.

use std::sync::{Arc, Mutex};

pub use log::Level;

/// Receiver for driver diagnostics.
pub trait DiagSink: Send + Sync {
    /// Record one diagnostic message at the given level.
    fn record(&self, level: Level, message: &str);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagSink for NullSink {
    fn record(&self, _level: Level, _message: &str) {}
}

/// Sink that forwards to the `log` facade under the `pn532_ndef` target.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagSink for LogSink {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "pn532_ndef", level, "{message}");
    }
}

/// Sink that keeps every entry in memory, for test assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().expect("diag sink poisoned").clone()
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .expect("diag sink poisoned")
            .iter()
            .any(|(_, m)| m.contains(needle))
    }
}

impl DiagSink for MemorySink {
    fn record(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .expect("diag sink poisoned")
            .push((level, message.to_string()));
    }
}

/// Shared handle to a diagnostics sink.
pub type SharedSink = Arc<dyn DiagSink>;

/// Default sink used when none is injected.
pub fn default_sink() -> SharedSink {
    Arc::new(LogSink)
}

macro_rules! diag {
    ($sink:expr, $level:expr, $($arg:tt)*) => {
        $sink.record($level, &format!($($arg)*))
    };
}

pub(crate) use diag;
