//! Explicitly constructed redacting loggers and their output sinks.
//!
//! A [`RedactingLogger`] owns its name, minimum level, formatter and sink.
//! There is no process-wide registry: callers build a logger and pass it to
//! whatever needs to log user data.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::redact::{Level, LogEvent, RedactingFormatter, PII_FIELDS};

/// Name of the logger used for user records.
pub const USER_DATA_LOGGER: &str = "user_data";

// ---------------------------------------------------------------------------
// LogSink trait
// ---------------------------------------------------------------------------

/// Destination for formatted log lines.
///
/// Implementations must be safe to call from multiple threads.
pub trait LogSink: Send + Sync {
    /// Write one already formatted line.
    ///
    /// Write failures are reported via `tracing` and NOT propagated; logging
    /// must never fail the operation being logged.
    fn write_line(&self, line: &str);
}

// ---------------------------------------------------------------------------
// StreamSink
// ---------------------------------------------------------------------------

/// Sink writing newline-terminated lines to any byte stream (stderr by default).
pub struct StreamSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StreamSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    fn write_to(writer: &mut dyn Write, line: &str) -> io::Result<()> {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl LogSink for StreamSink {
    fn write_line(&self, line: &str) {
        let mut guard = match self.writer.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                error!("Log sink mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };

        // Never echo the line into diagnostics.
        if let Err(e) = Self::write_to(&mut **guard, line) {
            error!(error = %e, "Failed to write log line");
        }
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// NullSink
// ---------------------------------------------------------------------------

/// A sink that discards every line.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write_line(&self, _line: &str) {}
}

// ---------------------------------------------------------------------------
// InMemorySink (for testing)
// ---------------------------------------------------------------------------

/// A sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    lines: Mutex<Vec<String>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

impl LogSink for InMemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(line.to_string());
    }
}

// ---------------------------------------------------------------------------
// RedactingLogger
// ---------------------------------------------------------------------------

/// Named logger that formats events through a [`RedactingFormatter`].
#[derive(Clone)]
pub struct RedactingLogger {
    name: String,
    min_level: Level,
    formatter: RedactingFormatter,
    sink: Arc<dyn LogSink>,
}

impl RedactingLogger {
    pub fn new(
        name: impl Into<String>,
        min_level: Level,
        formatter: RedactingFormatter,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            name: name.into(),
            min_level,
            formatter,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn formatter(&self) -> &RedactingFormatter {
        &self.formatter
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Format and emit `message` at `level`. Events below the minimum level are dropped.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        let event = LogEvent::new(self.name.as_str(), level, message);
        self.log_event(&event);
    }

    /// Emit a prebuilt event, still honouring the minimum level.
    pub fn log_event(&self, event: &LogEvent) {
        if !self.enabled(event.level) {
            return;
        }
        self.sink.write_line(&self.formatter.format(event));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }
}

impl fmt::Debug for RedactingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactingLogger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

/// The `user_data` logger: `Info` and above, redacting [`PII_FIELDS`].
pub fn user_data_logger(sink: Arc<dyn LogSink>) -> RedactingLogger {
    RedactingLogger::new(
        USER_DATA_LOGGER,
        Level::Info,
        RedactingFormatter::with_defaults(PII_FIELDS),
        sink,
    )
}
