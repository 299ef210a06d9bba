//! Leveled log output

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for the observer's formatted log lines.
///
/// Each call receives one complete line; the sink decides where it goes.
pub trait LogSink: Send + Sync {
    /// Informational channel.
    fn info(&self, line: &str);

    /// Warning channel.
    fn warn(&self, line: &str);
}

/// Forwards lines to `tracing` under the `perf_observer` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, line: &str) {
        tracing::info!(target: "perf_observer", "{}", line);
    }

    fn warn(&self, line: &str) {
        tracing::warn!(target: "perf_observer", "{}", line);
    }
}

/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

/// A line captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every line in memory.
///
/// Clones share the same buffer, so one handle can be given to an observer
/// while another is used to read back what was logged.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines recorded so far.
    pub fn lines(&self) -> Vec<LogLine> {
        self.buffer().clone()
    }

    /// Messages recorded at the given level.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .map(|line| line.message)
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(LogLevel::Info)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warn)
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn push(&self, level: LogLevel, line: &str) {
        self.buffer().push(LogLine {
            level,
            message: line.to_string(),
        });
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<LogLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for RecordingSink {
    fn info(&self, line: &str) {
        self.push(LogLevel::Info, line);
    }

    fn warn(&self, line: &str) {
        self.push(LogLevel::Warn, line);
    }
}
