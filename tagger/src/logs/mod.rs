//! Per-track progress logging.
//!
//! The pipeline never writes to a global logger. It is handed a [`LogSink`]
//! and reports every processed or failed track to it. Sinks can be combined:
//!
//! ```text
//! MultiSink ──▶ ConsoleSink   (stdout, glyph prefixes)
//!           └─▶ FileSink      (logs/<YYYYmmdd_HHMMSS>.log)
//! ```
//!
//! Any `Fn(LogEntry) + Send + Sync` closure is also a sink.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth (0 = top level)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0 }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering: indentation, glyph, message.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver of log entries. Shared across worker threads.
pub trait LogSink: Send + Sync {
    fn log(&self, entry: LogEntry);
}

impl<F> LogSink for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn log(&self, entry: LogEntry) {
        self(entry)
    }
}

/// Prints entries to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, entry: LogEntry) {
        println!("{}", entry.render());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _entry: LogEntry) {}
}

/// Appends entries to a run log file, one line each.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Create `<dir>/<YYYYmmdd_HHMMSS>.log`, creating `dir` if needed.
    pub fn create_in(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let name = format!("{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        Self::create(dir.join(name))
    }

    /// Create (or truncate) a log file at an exact path.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn log(&self, entry: LogEntry) {
        let line = format!(
            "{} - {} - {}{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            entry.level.label(),
            "  ".repeat(entry.indent as usize),
            entry.message
        );
        // A poisoned lock or a failed write must not abort a batch
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Fans entries out to several sinks, in order.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for MultiSink {
    fn log(&self, entry: LogEntry) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.log(entry.clone());
            }
            last.log(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_render_prefixes() {
        assert_eq!(LogEntry::info("Scanning").render(), "    Scanning");
        assert_eq!(LogEntry::success("done").render(), "   ✓ done");
        assert_eq!(
            LogEntry::error("bad").with_indent(1).render(),
            "      ❌ bad"
        );
    }

    #[test]
    fn test_closure_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |entry: LogEntry| captured.lock().unwrap().push(entry.message);

        sink.log(LogEntry::info("one"));
        sink.log(LogEntry::warning("two"));

        assert_eq!(*seen.lock().unwrap(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_multi_sink_fans_out() {
        let count = Arc::new(Mutex::new(0usize));
        let a = Arc::clone(&count);
        let b = Arc::clone(&count);

        let sink = MultiSink::new()
            .with(move |_: LogEntry| *a.lock().unwrap() += 1)
            .with(move |_: LogEntry| *b.lock().unwrap() += 1)
            .with(NullSink);

        sink.log(LogEntry::info("x"));
        assert_eq!(sink.len(), 3);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_file_sink_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::create_in(dir.path().join("logs")).unwrap();

        sink.log(LogEntry::info("Processing 2 files..."));
        sink.log(LogEntry::error("broken.flac: no title").with_indent(1));

        let name = sink.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "20240101_120000.log".len());

        let content = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO - Processing 2 files..."));
        assert!(lines[1].ends_with("ERROR -   broken.flac: no title"));
    }
}
