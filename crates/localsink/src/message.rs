//! Log message value type

use chrono::{DateTime, Local, NaiveDate};

/// An immutable, already-rendered log record
///
/// Created by the caller at enqueue time and carried through the queue
/// unchanged. The text is expected to be a complete, line-terminated
/// record; the sink appends it verbatim.
#[derive(Debug, Clone)]
pub struct LogMessage {
    timestamp: DateTime<Local>,
    text: String,
}

impl LogMessage {
    /// Create a new message from a timestamp and pre-rendered text
    #[inline]
    pub fn new(timestamp: DateTime<Local>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// The timestamp the record was produced at
    #[inline]
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// The rendered record text
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Calendar day this message belongs to (the file-grouping key)
    #[inline]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
