//! Alarm to log source resolution
//!
//! Strategies are tried in order and the first hit wins:
//! 1. Trigger lookup: metric filters feeding the metrics named by the alarm trigger
//! 2. Naming convention: the alarm name minus its `-<Severity>-Alarm` suffix,
//!    verified against the log service
//! 3. Static table: expected alarm names derived from `LOG_GROUPS_CONFIG`
//!
//! A strategy that finds nothing falls through to the next. A failed metadata
//! lookup aborts resolution.

use std::fmt;

use tracing::{debug, info, instrument, warn};

use crate::aws::{LogsClient, MetricFilterInfo};
use crate::config::{SourceTable, SourceTableEntry};
use crate::event::{AlarmEvent, MetricRef};
use crate::utils::AppError;

use super::model::SourceBinding;
use super::pattern::{normalize, normalize_optional};

/// Severity words recognized as alarm name suffixes
pub const SEVERITY_SUFFIXES: [&str; 6] = ["error", "warning", "critical", "info", "debug", "alert"];

/// Alarm created before the naming scheme, kept for backward compatibility
pub const LEGACY_ALARM_ALIAS: &str = "LS-AWSLAB-EC2-MTA01-Error-Alarm";
/// Source the legacy alarm watches
pub const LEGACY_ALIAS_SOURCE: &str = "LS-AWSLAB-EC2-MTA01-Log-messages";

const ALARM_SUFFIX: &str = "-alarm";
const NO_FILTERS_MATCHED: &str = "no metric filters matched";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Trigger,
    NamingConvention,
    StaticTable,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Trigger => "trigger",
            Strategy::NamingConvention => "naming_convention",
            Strategy::StaticTable => "static_table",
        };
        f.write_str(name)
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Source identifier implied by an alarm name.
///
/// Strips a trailing `-Alarm`, then a trailing `-<severity>`, ignoring case. A name
/// with neither suffix (or nothing left after stripping) is used verbatim.
pub fn source_id_from_alarm_name(alarm_name: &str) -> String {
    let without_alarm = strip_suffix_ignore_case(alarm_name, ALARM_SUFFIX).unwrap_or(alarm_name);

    let stripped = SEVERITY_SUFFIXES
        .iter()
        .find_map(|severity| strip_suffix_ignore_case(without_alarm, &format!("-{}", severity)))
        .unwrap_or(without_alarm);

    if stripped.is_empty() {
        alarm_name.to_string()
    } else {
        stripped.to_string()
    }
}

/// Filter used when a source has none configured, chosen by the source's suffix.
pub fn default_filter_for_source(source_id: &str) -> &'static str {
    if strip_suffix_ignore_case(source_id, "-messages").is_some() {
        "[error]"
    } else {
        "ERROR"
    }
}

/// Alarm name the provisioning scheme gives a statically configured source
pub fn expected_alarm_name(prefix: &str, display_name: &str) -> String {
    format!("{}-{}-Error-Alarm", prefix, display_name)
}

/// First filter in candidate order, then in the order the service returned them.
pub fn first_matching_filter(
    matches: &[(MetricRef, Vec<MetricFilterInfo>)],
) -> Option<&MetricFilterInfo> {
    matches
        .iter()
        .flat_map(|(_, filters)| filters.iter())
        .find(|filter| !filter.log_group_name.is_empty())
}

/// Static table entry whose expected alarm name equals `alarm_name`.
pub fn lookup_static_table<'a>(
    table: &'a SourceTable,
    prefix: &str,
    alarm_name: &str,
) -> Option<(&'a str, &'a SourceTableEntry)> {
    let by_expected_name = table
        .iter()
        .find(|(_, entry)| expected_alarm_name(prefix, &entry.display_name) == alarm_name)
        .map(|(id, entry)| (id.as_str(), entry));

    by_expected_name.or_else(|| {
        if alarm_name != LEGACY_ALARM_ALIAS {
            return None;
        }
        table
            .get(LEGACY_ALIAS_SOURCE)
            .map(|entry| (LEGACY_ALIAS_SOURCE, entry))
    })
}

/// Maps alarms to the log source and filter that caused them
#[derive(Clone)]
pub struct SourceResolver {
    logs: LogsClient,
    table: SourceTable,
    alarm_name_prefix: String,
}

impl SourceResolver {
    pub fn new(logs: LogsClient, table: SourceTable, alarm_name_prefix: impl Into<String>) -> Self {
        Self {
            logs,
            table,
            alarm_name_prefix: alarm_name_prefix.into(),
        }
    }

    /// Resolve the alarm's log source.
    ///
    /// # Errors
    /// `AppError::Resolution` when no strategy finds a source or a metadata lookup
    /// fails.
    #[instrument(skip(self, event), fields(alarm_name = %event.name))]
    pub async fn resolve(&self, event: &AlarmEvent) -> Result<SourceBinding, AppError> {
        let mut misses: Vec<String> = Vec::new();

        match self.resolve_by_trigger(event).await? {
            Some(binding) => return Ok(self.found(Strategy::Trigger, binding)),
            None => {
                if event.trigger.is_some() {
                    misses.push(NO_FILTERS_MATCHED.to_string());
                }
            }
        }

        match self.resolve_by_naming(&event.name).await? {
            Some(binding) => return Ok(self.found(Strategy::NamingConvention, binding)),
            None => misses.push(format!(
                "no log source named {}",
                source_id_from_alarm_name(&event.name)
            )),
        }

        match self.resolve_by_table(&event.name) {
            Some(binding) => return Ok(self.found(Strategy::StaticTable, binding)),
            None => misses.push("no static table entry".to_string()),
        }

        warn!(alarm_name = %event.name, reasons = ?misses, "Could not resolve log source");
        Err(AppError::resolution(format!(
            "could not resolve log source for alarm {}: {}",
            event.name,
            misses.join("; ")
        )))
    }

    fn found(&self, strategy: Strategy, binding: SourceBinding) -> SourceBinding {
        info!(
            strategy = %strategy,
            source_id = %binding.source_id,
            filter = %binding.filter_expression,
            "Resolved log source"
        );
        binding
    }

    /// Strategy 1. `None` when the alarm has no trigger or no filter matched.
    pub async fn resolve_by_trigger(
        &self,
        event: &AlarmEvent,
    ) -> Result<Option<SourceBinding>, AppError> {
        let candidates = match &event.trigger {
            Some(trigger) => trigger.candidates(),
            None => {
                debug!("Alarm payload has no trigger, skipping trigger lookup");
                return Ok(None);
            }
        };

        let mut matches = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let filters = self
                .logs
                .metric_filters_for_metric(&candidate.namespace, &candidate.metric_name)
                .await
                .map_err(|e| {
                    AppError::resolution(format!("metric filter lookup failed: {}", e.message()))
                })?;
            debug!(
                namespace = %candidate.namespace,
                metric_name = %candidate.metric_name,
                count = filters.len(),
                "Metric filters for trigger metric"
            );
            matches.push((candidate, filters));
        }

        let total: usize = matches.iter().map(|(_, filters)| filters.len()).sum();
        if total > 1 {
            debug!(total, "Several metric filters matched, using the first");
        }

        Ok(first_matching_filter(&matches)
            .map(|filter| self.binding(&filter.log_group_name, Some(filter.filter_pattern.as_str()))))
    }

    /// Strategy 2. `None` when the inferred source does not exist.
    pub async fn resolve_by_naming(
        &self,
        alarm_name: &str,
    ) -> Result<Option<SourceBinding>, AppError> {
        let source_id = source_id_from_alarm_name(alarm_name);

        let exists = self.logs.source_exists(&source_id).await.map_err(|e| {
            AppError::resolution(format!("log source lookup failed: {}", e.message()))
        })?;
        if !exists {
            debug!(source_id = %source_id, "Inferred log source does not exist");
            return Ok(None);
        }

        let filters = self
            .logs
            .metric_filters_for_source(&source_id)
            .await
            .map_err(|e| {
                AppError::resolution(format!("metric filter lookup failed: {}", e.message()))
            })?;
        let configured = filters
            .iter()
            .map(|f| f.filter_pattern.as_str())
            .find(|pattern| !normalize(pattern).is_empty());

        Ok(Some(self.binding(&source_id, configured)))
    }

    /// Strategy 3. Pure lookup in the static table.
    pub fn resolve_by_table(&self, alarm_name: &str) -> Option<SourceBinding> {
        let (source_id, entry) =
            lookup_static_table(&self.table, &self.alarm_name_prefix, alarm_name)?;
        Some(self.binding(source_id, entry.filter_pattern.as_deref()))
    }

    /// Build a binding, falling back to the suffix default when the filter is
    /// absent or blank. Display name and description come from the static table
    /// when the source is listed there.
    fn binding(&self, source_id: &str, filter: Option<&str>) -> SourceBinding {
        let filter_expression = if normalize_optional(filter).is_empty() {
            default_filter_for_source(source_id).to_string()
        } else {
            filter.unwrap_or_default().to_string()
        };

        let entry = self.table.get(source_id);
        let display_name = entry
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| source_id.to_string());
        let description = entry
            .and_then(|e| e.description.clone())
            .unwrap_or_else(|| format!("Log group {}", source_id));

        SourceBinding {
            source_id: source_id.to_string(),
            filter_expression,
            display_name,
            description,
        }
    }
}
