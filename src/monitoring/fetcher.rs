//! Time-window log retrieval
//!
//! Log retrieval is best-effort: a failed query yields no entries and the report
//! says so, but the notification still goes out.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

use crate::aws::{LogQuery, LogsClient};

use super::model::{LogEntry, TimeWindow};
use super::pattern::normalize;

/// Entries requested for a datapoint window (more than are kept)
pub const WINDOW_QUERY_LIMIT: i32 = 20;
/// Entries requested for the recent fallback search
pub const RECENT_QUERY_LIMIT: i32 = 10;
/// Hours searched by the recent fallback
pub const DEFAULT_HOURS_BACK: i64 = 1;
/// Most entries ever returned
pub const MAX_ENTRIES: usize = 10;

/// Newest first, at most `cap` entries.
pub fn sort_and_cap(mut entries: Vec<LogEntry>, cap: usize) -> Vec<LogEntry> {
    entries.sort_by(|a, b| b.timestamp_millis.cmp(&a.timestamp_millis));
    entries.truncate(cap);
    entries
}

/// Queries a log source for the entries behind an alarm
#[derive(Clone)]
pub struct LogWindowFetcher {
    logs: LogsClient,
    window_limit: i32,
    recent_limit: i32,
    cap: usize,
}

impl LogWindowFetcher {
    pub fn new(logs: LogsClient) -> Self {
        Self {
            logs,
            window_limit: WINDOW_QUERY_LIMIT,
            recent_limit: RECENT_QUERY_LIMIT,
            cap: MAX_ENTRIES,
        }
    }

    /// Set the per-query limits and the cap on returned entries
    pub fn with_limits(mut self, window_limit: i32, recent_limit: i32, cap: usize) -> Self {
        self.window_limit = window_limit;
        self.recent_limit = recent_limit;
        self.cap = cap;
        self
    }

    /// Entries matching `filter_expression` in `[window.start, window.end())`.
    #[instrument(skip(self, window), fields(start = %window.start))]
    pub async fn fetch_window(
        &self,
        source_id: &str,
        filter_expression: &str,
        window: &TimeWindow,
    ) -> Vec<LogEntry> {
        let query = LogQuery {
            source_id: source_id.to_string(),
            start_millis: window.start.timestamp_millis(),
            end_millis: window.end().timestamp_millis(),
            filter_pattern: normalize(filter_expression),
            limit: self.window_limit,
        };
        info!(
            source_id = %source_id,
            end = %window.end(),
            period_secs = window.duration_secs,
            "Searching logs in datapoint period"
        );
        self.run(query).await
    }

    /// Entries from the last `hours_back` hours, for alarms without a datapoint.
    pub async fn fetch_recent(
        &self,
        source_id: &str,
        filter_expression: &str,
        hours_back: i64,
    ) -> Vec<LogEntry> {
        self.fetch_recent_until(source_id, filter_expression, hours_back, Utc::now())
            .await
    }

    /// [`fetch_recent`](Self::fetch_recent) with an explicit window end.
    #[instrument(skip(self))]
    pub async fn fetch_recent_until(
        &self,
        source_id: &str,
        filter_expression: &str,
        hours_back: i64,
        end: DateTime<Utc>,
    ) -> Vec<LogEntry> {
        let start = end - Duration::hours(hours_back);
        let query = LogQuery {
            source_id: source_id.to_string(),
            start_millis: start.timestamp_millis(),
            end_millis: end.timestamp_millis(),
            filter_pattern: normalize(filter_expression),
            limit: self.recent_limit,
        };
        self.run(query).await
    }

    async fn run(&self, query: LogQuery) -> Vec<LogEntry> {
        match self.logs.filter_log_events(&query).await {
            Ok(entries) => {
                let found = entries.len();
                let entries = sort_and_cap(entries, self.cap);
                info!(found, kept = entries.len(), "Retrieved log entries");
                entries
            }
            Err(e) => {
                warn!(
                    source_id = %query.source_id,
                    error = %e,
                    "Log query failed, continuing without log entries"
                );
                Vec::new()
            }
        }
    }
}
