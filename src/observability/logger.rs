//! Structured JSON logger
//!
//! - One log line = one event
//! - Structured fields, deterministic key ordering
//! - Synchronous, no buffering
//!
//! Determinism matters here because log lines are asserted on in tests and
//! diffed across runs; field order must not depend on call-site order.

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info = 0,
    /// Recoverable issues (integrity warnings, denied requests)
    Warn = 1,
    /// Operation failures
    Error = 2,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs single-line JSON events
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields to stdout.
    ///
    /// Fields are output in deterministic order (alphabetical by key),
    /// after the fixed `event` and `severity` keys.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        let _ = writeln!(io::stdout(), "{}", line);
    }

    /// Log to stderr (for errors that must not be lost in piped output)
    pub fn log_stderr(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        let _ = writeln!(io::stderr(), "{}", line);
    }

    /// Render one event as a JSON line.
    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(128);
        out.push('{');

        out.push_str("\"event\":\"");
        Self::escape(&mut out, event);
        out.push('"');

        out.push_str(",\"severity\":\"");
        out.push_str(severity.as_str());
        out.push('"');

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted {
            out.push_str(",\"");
            Self::escape(&mut out, key);
            out.push_str("\":\"");
            Self::escape(&mut out, value);
            out.push('"');
        }

        out.push('}');
        out
    }

    /// Minimal JSON string escaping.
    fn escape(out: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        }
    }
}
