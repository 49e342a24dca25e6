//! Data returned by the platform clients, decoupled from SDK types.

/// A metric filter: which log source feeds a metric, and with what pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFilterInfo {
    pub filter_name: String,
    pub log_group_name: String,
    pub filter_pattern: String,
}

/// Log query bounds. `end_millis` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub source_id: String,
    pub start_millis: i64,
    pub end_millis: i64,
    pub filter_pattern: String,
    pub limit: i32,
}

/// Live alarm configuration used to enrich the report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmDetails {
    pub threshold: Option<f64>,
    pub comparison_operator: Option<String>,
    pub evaluation_periods: Option<i32>,
    pub datapoints_to_alarm: Option<i32>,
    pub period: Option<i32>,
    pub statistic: Option<String>,
    pub namespace: Option<String>,
    pub metric_name: Option<String>,
    pub unit: Option<String>,
    pub treat_missing_data: Option<String>,
    /// Number of metric-math queries, for alarms without a single metric
    pub metric_query_count: usize,
    pub ok_actions: Vec<String>,
    pub alarm_actions: Vec<String>,
    pub insufficient_data_actions: Vec<String>,
}
