//! Alarm event structure and related types

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::utils::AppError;

/// Alarm states reported by the monitoring service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
    /// Any state value this relay does not know about, kept verbatim
    Other(String),
}

impl AlarmState {
    pub fn as_str(&self) -> &str {
        match self {
            AlarmState::Ok => "OK",
            AlarmState::Alarm => "ALARM",
            AlarmState::InsufficientData => "INSUFFICIENT_DATA",
            AlarmState::Other(value) => value,
        }
    }

    pub fn is_alarm(&self) -> bool {
        matches!(self, AlarmState::Alarm)
    }
}

impl FromStr for AlarmState {
    type Err = std::convert::Infallible;

    /// Exact match only: `"alarm"` is not the ALARM state.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "OK" => AlarmState::Ok,
            "ALARM" => AlarmState::Alarm,
            "INSUFFICIENT_DATA" => AlarmState::InsufficientData,
            other => AlarmState::Other(other.to_string()),
        })
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (namespace, metric name) pair named by an alarm trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRef {
    pub namespace: String,
    pub metric_name: String,
}

impl MetricRef {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
        }
    }
}

/// Trigger description embedded in the alarm notification payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trigger {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
    /// Metric-math form: a list of queries, some of which carry a metric stat
    #[serde(default)]
    pub metrics: Vec<TriggerMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerMetric {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub metric_stat: Option<TriggerMetricStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerMetricStat {
    #[serde(default)]
    pub metric: Option<TriggerMetricId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TriggerMetricId {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub metric_name: Option<String>,
}

impl Trigger {
    /// Candidate metrics in payload order: the single metric first, then the
    /// metric-math queries that reference a metric. Duplicates are dropped.
    pub fn candidates(&self) -> Vec<MetricRef> {
        let single = match (&self.namespace, &self.metric_name) {
            (Some(ns), Some(name)) => Some(MetricRef::new(ns.as_str(), name.as_str())),
            _ => None,
        };

        let from_math = self.metrics.iter().filter_map(|m| {
            let metric = m.metric_stat.as_ref()?.metric.as_ref()?;
            Some(MetricRef::new(
                metric.namespace.as_deref()?,
                metric.metric_name.as_deref()?,
            ))
        });

        let mut candidates: Vec<MetricRef> = Vec::new();
        for candidate in single.into_iter().chain(from_math) {
            if candidate.namespace.is_empty() || candidate.metric_name.is_empty() {
                continue;
            }
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

/// Alarm notification payload as delivered by the notification transport
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAlarmPayload {
    alarm_name: Option<String>,
    #[serde(default)]
    alarm_description: Option<String>,
    #[serde(rename = "AWSAccountId", default)]
    aws_account_id: Option<String>,
    new_state_value: Option<String>,
    #[serde(default)]
    new_state_reason: Option<String>,
    #[serde(default)]
    state_change_time: Option<String>,
    #[serde(default)]
    old_state_value: Option<String>,
    #[serde(default)]
    alarm_arn: Option<String>,
    #[serde(default)]
    trigger: Option<Trigger>,
}

/// State-change event shape used for direct invocations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStateChangeEvent {
    alarm_data: RawAlarmData,
    #[serde(default)]
    alarm_description: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    resources: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlarmData {
    alarm_name: Option<String>,
    #[serde(default)]
    state: Option<RawStateValue>,
    #[serde(default)]
    previous_state: Option<RawStateValue>,
    #[serde(default)]
    configuration: Option<RawAlarmConfiguration>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStateValue {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlarmConfiguration {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    metrics: Vec<RawConfigurationMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfigurationMetric {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    metric_stat: Option<RawConfigurationMetricStat>,
}

#[derive(Debug, Deserialize)]
struct RawConfigurationMetricStat {
    #[serde(default)]
    metric: Option<RawConfigurationMetricId>,
}

#[derive(Debug, Deserialize)]
struct RawConfigurationMetricId {
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// One alarm state transition, built fresh per invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmEvent {
    pub name: String,
    pub description: String,
    pub previous_state: AlarmState,
    pub new_state: AlarmState,
    pub reason_text: String,
    pub change_timestamp: String,
    pub arn: String,
    pub account_id: Option<String>,
    pub trigger: Option<Trigger>,
}

impl AlarmEvent {
    /// Build an alarm event from either accepted payload shape.
    ///
    /// # Errors
    /// Returns `AppError::InvalidEvent` when the payload matches neither shape or
    /// lacks the alarm name or new state.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, AppError> {
        if value.get("AlarmName").is_some() {
            let raw: RawAlarmPayload = serde_json::from_value(value.clone())
                .map_err(|e| AppError::invalid_event(format!("Malformed alarm payload: {}", e)))?;
            return Self::from_alarm_payload(raw);
        }

        if value.get("alarmData").is_some() {
            let raw: RawStateChangeEvent = serde_json::from_value(value.clone()).map_err(|e| {
                AppError::invalid_event(format!("Malformed state-change event: {}", e))
            })?;
            return Self::from_state_change(raw);
        }

        Err(AppError::invalid_event("Unknown alarm event format"))
    }

    fn from_alarm_payload(raw: RawAlarmPayload) -> Result<Self, AppError> {
        let name = raw
            .alarm_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::invalid_event("AlarmName is required"))?;
        let new_state = raw
            .new_state_value
            .ok_or_else(|| AppError::invalid_event("NewStateValue is required"))?;

        Ok(Self {
            name,
            description: raw.alarm_description.unwrap_or_default(),
            previous_state: parse_state(raw.old_state_value.as_deref()),
            new_state: parse_state(Some(&new_state)),
            reason_text: raw.new_state_reason.unwrap_or_default(),
            change_timestamp: raw.state_change_time.unwrap_or_else(now_iso),
            arn: raw.alarm_arn.unwrap_or_default(),
            account_id: raw.aws_account_id.filter(|a| !a.is_empty()),
            trigger: raw.trigger,
        })
    }

    fn from_state_change(raw: RawStateChangeEvent) -> Result<Self, AppError> {
        let data = raw.alarm_data;
        let name = data
            .alarm_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::invalid_event("alarmData.alarmName is required"))?;
        let state = data.state.unwrap_or_default();
        let new_state = state
            .value
            .ok_or_else(|| AppError::invalid_event("alarmData.state.value is required"))?;
        let configuration = data.configuration.unwrap_or_default();

        let metrics: Vec<TriggerMetric> = configuration
            .metrics
            .into_iter()
            .filter_map(|m| {
                let metric = m.metric_stat?.metric?;
                Some(TriggerMetric {
                    id: m.id,
                    metric_stat: Some(TriggerMetricStat {
                        metric: Some(TriggerMetricId {
                            namespace: metric.namespace,
                            metric_name: metric.name,
                        }),
                    }),
                })
            })
            .collect();
        let trigger = (!metrics.is_empty()).then(|| Trigger {
            namespace: None,
            metric_name: None,
            metrics,
        });

        Ok(Self {
            name,
            description: raw
                .alarm_description
                .or(configuration.description)
                .unwrap_or_default(),
            previous_state: parse_state(
                data.previous_state.as_ref().and_then(|s| s.value.as_deref()),
            ),
            new_state: parse_state(Some(&new_state)),
            reason_text: state.reason.unwrap_or_default(),
            change_timestamp: state.timestamp.unwrap_or_else(now_iso),
            arn: raw.resources.into_iter().next().unwrap_or_default(),
            account_id: raw.account.filter(|a| !a.is_empty()),
            trigger,
        })
    }

    /// Account id from the payload, else the fifth field of the alarm ARN.
    pub fn resolved_account_id(&self) -> Option<String> {
        if let Some(account) = &self.account_id {
            return Some(account.clone());
        }
        self.arn
            .split(':')
            .nth(4)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
    }
}

fn parse_state(value: Option<&str>) -> AlarmState {
    match value {
        Some(v) => v.parse().unwrap_or(AlarmState::Other(v.to_string())),
        None => AlarmState::Other("UNKNOWN".to_string()),
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}
