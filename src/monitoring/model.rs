//! Values passed between pipeline stages. None outlives one invocation.

use chrono::{DateTime, Duration, Utc};

/// Fixed evaluation period searched around the datapoint timestamp
pub const WINDOW_DURATION_SECS: i64 = 300;

/// Log source resolved for an alarm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBinding {
    pub source_id: String,
    pub filter_expression: String,
    pub display_name: String,
    pub description: String,
}

/// One log line returned by a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_millis: i64,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp_millis: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            message: message.into(),
        }
    }
}

/// Query bounds derived from the alarm's datapoint timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub duration_secs: i64,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            duration_secs: WINDOW_DURATION_SECS,
        }
    }

    /// Exclusive end of the window
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(self.duration_secs)
    }
}

/// How the reported log entries were searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    /// The evaluation period starting at the datapoint timestamp
    DatapointPeriod(TimeWindow),
    /// The trailing hours before invocation
    Recent { hours_back: i64 },
}

/// Subject and body handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReport {
    pub subject: String,
    pub body: String,
}
