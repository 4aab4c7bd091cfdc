//! Per-compilation diagnostic sink.
//!
//! Every compilation gets its own [`LogSink`]; nothing in the pipeline writes
//! to shared state. Lines are also forwarded to `tracing` so a host that
//! installs a subscriber sees them as structured events.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic line. Rendered as a glyph prefix for hosts that
/// classify lines by their first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Fatal,
    Warn,
    Success,
    Info,
}

impl Level {
    pub fn glyph(self) -> &'static str {
        match self {
            Level::Fatal => "❌ ",
            Level::Warn => "⚠️ ",
            Level::Success => "✅ ",
            Level::Info => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.level.glyph(), self.message)
    }
}

/// Ordered collection of diagnostic lines for one compilation.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    lines: Vec<LogLine>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Fatal => tracing::error!(target: "rememo", "{message}"),
            Level::Warn => tracing::warn!(target: "rememo", "{message}"),
            Level::Success => tracing::info!(target: "rememo", "{message}"),
            Level::Info => tracing::debug!(target: "rememo", "{message}"),
        }
        self.lines.push(LogLine { level, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Level::Warn, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn fatal(&mut self, message: impl Into<String>) {
        self.push(Level::Fatal, message);
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Lines rendered with their glyph prefix, in push order.
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines.iter().filter(|l| l.level == level).count()
    }
}
