//! Record rendering
//!
//! The two supported encodings, as pure functions: a plain text line and
//! one JSON object per line. Both produce complete, terminated records
//! ready for [`LocalFileSink::enqueue`](crate::LocalFileSink::enqueue);
//! the sink itself never inspects record contents.

use chrono::{DateTime, Local, Utc};

/// Default timestamp format for plain text records
const PLAIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

/// Default timestamp format for JSON records (universal sortable)
const JSON_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Severity of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "Trace",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Critical => "Critical",
        }
    }
}

/// Rendering options shared by both encodings
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Override for the timestamp format (chrono `format` syntax)
    pub timestamp_format: Option<String>,

    /// Render timestamps in UTC instead of local time
    pub use_utc_timestamp: bool,
}

impl RenderOptions {
    fn format_timestamp(&self, timestamp: DateTime<Local>, default: &str) -> String {
        let format = self.timestamp_format.as_deref().unwrap_or(default);
        if self.use_utc_timestamp {
            timestamp.with_timezone(&Utc).format(format).to_string()
        } else {
            timestamp.format(format).to_string()
        }
    }
}

/// Render a plain text record: `{timestamp} [{Level}] {category}: {message}`
///
/// Embedded line breaks in the message are replaced with `"; "` so each
/// record stays a single line; the result is newline terminated.
pub fn render_plain(
    timestamp: DateTime<Local>,
    level: Level,
    category: &str,
    message: &str,
    options: &RenderOptions,
) -> String {
    let mut line = String::with_capacity(64 + category.len() + message.len());
    line.push_str(&options.format_timestamp(timestamp, PLAIN_TIMESTAMP_FORMAT));
    line.push_str(" [");
    line.push_str(level.as_str());
    line.push_str("] ");
    line.push_str(category);
    line.push_str(": ");
    line.push_str(message);

    let mut line = line
        .replace("\r\n", "; ")
        .replace(['\r', '\n'], "; ");
    line.push('\n');
    line
}

/// Render a JSON record, one object per line, CRLF terminated
///
/// An empty message omits the `Message` key rather than writing an
/// empty string.
pub fn render_json(
    timestamp: DateTime<Local>,
    level: Level,
    category: &str,
    message: &str,
    options: &RenderOptions,
) -> String {
    let mut object = serde_json::Map::new();
    object.insert(
        "Timestamp".into(),
        options
            .format_timestamp(timestamp, JSON_TIMESTAMP_FORMAT)
            .into(),
    );
    object.insert("LogLevel".into(), level.as_str().into());
    object.insert("Category".into(), category.into());
    if !message.is_empty() {
        object.insert("Message".into(), message.into());
    }

    let mut line = serde_json::Value::Object(object).to_string();
    line.push_str("\r\n");
    line
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
