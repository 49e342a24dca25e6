//! Notification report formatting
//!
//! The body always has the same sections in the same order. A section with no
//! data renders a fixed placeholder instead of disappearing, so recipients can
//! rely on the layout.

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{instrument, warn};

use crate::aws::{AlarmClientTrait, AlarmDetails};
use crate::event::AlarmEvent;

use super::model::{LogEntry, NotificationReport, SearchMethod, SourceBinding};
use super::pattern::normalize;
use super::region;

/// Entries listed in the body
pub const MAX_LISTED_ENTRIES: usize = 5;
/// Longest message listed before truncation
pub const MAX_MESSAGE_CHARS: usize = 300;

/// The log block is rendered in Japanese for the receiving operators.
pub const LOG_BLOCK_HEADING: &str = "【検出されたエラーログ】";
pub const RETRIEVAL_FAILED_PLACEHOLDER: &str = "詳細なエラーログの取得に失敗しました。";
pub const THRESHOLD_PLACEHOLDER: &str = "- Threshold details are unavailable.";
pub const METRIC_PLACEHOLDER: &str = "- Monitored metric details are unavailable.";
pub const ACTIONS_PLACEHOLDER: &str = "- State change actions are unavailable.";
const NOT_PROVIDED: &str = "(not provided)";

pub const UNSUBSCRIBE_NOTE: &str = "Note: Do not use the \"unsubscribe\" link in this notification. \
Unsubscribing removes this address from the alert topic for every alarm routed through it. \
Ask the monitoring administrators to change your subscription instead.";

/// `quote(s, safe='')` equivalent: everything but unreserved characters is encoded
const LINK_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Everything the formatter needs for one alarm
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub event: &'a AlarmEvent,
    pub binding: &'a SourceBinding,
    pub search: SearchMethod,
    pub entries: &'a [LogEntry],
    pub account_id: &'a str,
    pub region: &'a str,
    pub enrichment: Option<&'a AlarmDetails>,
}

/// Live alarm configuration for the enrichment sections; `None` on any failure.
#[instrument(skip(alarms))]
pub async fn fetch_enrichment(alarms: &dyn AlarmClientTrait, alarm_name: &str) -> Option<AlarmDetails> {
    match alarms.describe_alarm(alarm_name).await {
        Ok(Some(details)) => Some(details),
        Ok(None) => {
            warn!("Alarm not found while fetching details, using placeholders");
            None
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch alarm details, using placeholders");
            None
        }
    }
}

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, LINK_COMPONENT).to_string()
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

fn format_entry_time(timestamp_millis: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(instant) => instant.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp_millis.to_string(),
    }
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() > MAX_MESSAGE_CHARS {
        let head: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

fn format_actions(actions: &[String]) -> String {
    format!("[{}]", actions.join(", "))
}

/// Renders alarm reports
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(ctx: &ReportContext<'_>) -> NotificationReport {
        let sections = [
            Self::summary(ctx),
            Self::log_block(ctx),
            Self::links(ctx),
            Self::metadata(ctx),
            Self::threshold_block(ctx.enrichment),
            Self::metric_block(ctx.enrichment),
            Self::actions_block(ctx.enrichment),
            UNSUBSCRIBE_NOTE.to_string(),
        ];

        NotificationReport {
            subject: Self::subject(&ctx.event.name, ctx.region),
            body: sections.join("\n\n") + "\n",
        }
    }

    pub fn subject(alarm_name: &str, region: &str) -> String {
        format!("ALARM: \"{}\" in {}", alarm_name, region::long_name(region))
    }

    fn summary(ctx: &ReportContext<'_>) -> String {
        format!(
            "You are receiving this email because your Amazon CloudWatch Alarm \"{}\" in the {} region has entered the {} state from {}, because \"{}\" at \"{}\".",
            ctx.event.name,
            region::long_name(ctx.region),
            ctx.event.new_state,
            ctx.event.previous_state,
            or_placeholder(&ctx.event.reason_text),
            ctx.event.change_timestamp,
        )
    }

    fn log_block(ctx: &ReportContext<'_>) -> String {
        let mut block = format!("{}\n", LOG_BLOCK_HEADING);
        let _ = writeln!(
            block,
            "・対象ログ: {} ({})",
            ctx.binding.display_name, ctx.binding.source_id
        );
        let _ = writeln!(block, "・説明: {}", or_placeholder(&ctx.binding.description));
        let _ = writeln!(
            block,
            "・フィルター: {}",
            or_placeholder(&normalize(&ctx.binding.filter_expression))
        );
        let searched = match ctx.search {
            SearchMethod::DatapointPeriod(window) => format!(
                "アラーム発生の原因となったメトリクス期間（{}分間、{} UTC から）",
                window.duration_secs / 60,
                window.start.format("%Y-%m-%d %H:%M:%S")
            ),
            SearchMethod::Recent { hours_back } => format!("過去{}時間", hours_back),
        };
        let _ = writeln!(block, "・検索範囲: {}", searched);

        if ctx.entries.is_empty() {
            block.push('\n');
            block.push_str(RETRIEVAL_FAILED_PLACEHOLDER);
            return block;
        }

        let _ = writeln!(block, "\n{} 件のエラーが検出されました:", ctx.entries.len());
        for (index, entry) in ctx.entries.iter().take(MAX_LISTED_ENTRIES).enumerate() {
            let _ = write!(
                block,
                "\n{}. {}\n   {}\n",
                index + 1,
                format_entry_time(entry.timestamp_millis),
                truncate_message(&entry.message)
            );
        }
        if ctx.entries.len() > MAX_LISTED_ENTRIES {
            let _ = write!(
                block,
                "\n... 他 {} 件のエラーログがあります",
                ctx.entries.len() - MAX_LISTED_ENTRIES
            );
        }
        block.trim_end().to_string()
    }

    fn links(ctx: &ReportContext<'_>) -> String {
        let alarm_link = format!(
            "https://{region}.console.aws.amazon.com/cloudwatch/deeplink.js?region={region}#alarmsV2:alarm/{name}",
            region = ctx.region,
            name = encode_component(&ctx.event.name),
        );
        let log_link = format!(
            "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#logsV2:log-groups/log-group/{group}",
            region = ctx.region,
            group = encode_component(&ctx.binding.source_id),
        );
        format!(
            "View this alarm in the AWS Management Console:\n{}\n\nView the log group:\n{}",
            alarm_link, log_link
        )
    }

    fn metadata(ctx: &ReportContext<'_>) -> String {
        let event = ctx.event;
        let rows = [
            ("Name", event.name.clone()),
            ("Description", or_placeholder(&event.description).to_string()),
            (
                "State Change",
                format!("{} -> {}", event.previous_state, event.new_state),
            ),
            ("Reason for State Change", or_placeholder(&event.reason_text).to_string()),
            ("Timestamp", or_placeholder(&event.change_timestamp).to_string()),
            ("AWS Account", or_placeholder(ctx.account_id).to_string()),
            ("Alarm Arn", or_placeholder(&event.arn).to_string()),
            ("Region", region::long_name(ctx.region).to_string()),
        ];

        let mut block = String::from("Alarm Details:");
        for (label, value) in rows {
            let _ = write!(block, "\n- {:<26}{}", format!("{}:", label), value);
        }
        block
    }

    fn threshold_block(details: Option<&AlarmDetails>) -> String {
        let line = details.and_then(|d| {
            let threshold = d.threshold?;
            let operator = d.comparison_operator.as_deref()?;
            let evaluation_periods = d.evaluation_periods.unwrap_or(1);
            let datapoints = d.datapoints_to_alarm.unwrap_or(evaluation_periods);
            let period = d
                .period
                .map(|p| format!(" of {} seconds", p))
                .unwrap_or_default();
            Some(format!(
                "- The alarm is in the ALARM state when the metric is {} {} for at least {} of the last {} period(s){}.",
                operator, threshold, datapoints, evaluation_periods, period
            ))
        });

        format!("Threshold:\n{}", line.as_deref().unwrap_or(THRESHOLD_PLACEHOLDER))
    }

    fn metric_block(details: Option<&AlarmDetails>) -> String {
        let body = details.and_then(|d| {
            let mut rows: Vec<(&str, String)> = Vec::new();
            match (&d.namespace, &d.metric_name) {
                (Some(namespace), Some(metric_name)) => {
                    rows.push(("MetricNamespace", namespace.clone()));
                    rows.push(("MetricName", metric_name.clone()));
                }
                _ if d.metric_query_count > 0 => {
                    rows.push((
                        "Metrics",
                        format!("metric math over {} queries", d.metric_query_count),
                    ));
                }
                _ => return None,
            }
            if let Some(period) = d.period {
                rows.push(("Period", format!("{} seconds", period)));
            }
            if let Some(statistic) = &d.statistic {
                rows.push(("Statistic", statistic.clone()));
            }
            rows.push((
                "Unit",
                d.unit.clone().unwrap_or_else(|| "not specified".to_string()),
            ));
            if let Some(treat_missing_data) = &d.treat_missing_data {
                rows.push(("TreatMissingData", treat_missing_data.clone()));
            }

            let mut text = String::new();
            for (label, value) in rows {
                let _ = writeln!(text, "- {:<26}{}", format!("{}:", label), value);
            }
            Some(text.trim_end().to_string())
        });

        format!("Monitored Metric:\n{}", body.as_deref().unwrap_or(METRIC_PLACEHOLDER))
    }

    fn actions_block(details: Option<&AlarmDetails>) -> String {
        let body = details.map(|d| {
            format!(
                "- OK: {}\n- ALARM: {}\n- INSUFFICIENT_DATA: {}",
                format_actions(&d.ok_actions),
                format_actions(&d.alarm_actions),
                format_actions(&d.insufficient_data_actions)
            )
        });

        format!("State Change Actions:\n{}", body.as_deref().unwrap_or(ACTIONS_PLACEHOLDER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::client::MockAlarmClientTrait;
    use crate::event::AlarmState;
    use crate::monitoring::model::TimeWindow;
    use crate::utils::AppError;

    fn event() -> AlarmEvent {
        AlarmEvent {
            name: "LS-AWSLAB-EC2-MTA01-App-Error-Alarm".to_string(),
            description: "application errors".to_string(),
            previous_state: AlarmState::Ok,
            new_state: AlarmState::Alarm,
            reason_text: "Threshold Crossed: 1 datapoint [2.0 (04/08/25 05:16:00)]".to_string(),
            change_timestamp: "2025-08-04T05:21:00.000+0000".to_string(),
            arn: "arn:aws:cloudwatch:ap-northeast-1:123456789012:alarm:LS-AWSLAB-EC2-MTA01-App-Error-Alarm".to_string(),
            account_id: None,
            trigger: None,
        }
    }

    fn binding() -> SourceBinding {
        SourceBinding {
            source_id: "LS-AWSLAB-EC2-MTA01-Log-app".to_string(),
            filter_expression: "ERROR".to_string(),
            display_name: "EC2-MTA01-App".to_string(),
            description: "application log".to_string(),
        }
    }

    fn details() -> AlarmDetails {
        AlarmDetails {
            threshold: Some(1.0),
            comparison_operator: Some("GreaterThanOrEqualToThreshold".to_string()),
            evaluation_periods: Some(1),
            datapoints_to_alarm: None,
            period: Some(300),
            statistic: Some("Sum".to_string()),
            namespace: Some("LS-AWSLAB-ErrorMonitoring".to_string()),
            metric_name: Some("EC2-MTA01-App-Error".to_string()),
            unit: None,
            treat_missing_data: Some("notBreaching".to_string()),
            metric_query_count: 0,
            ok_actions: vec![],
            alarm_actions: vec!["arn:aws:sns:ap-northeast-1:123456789012:processing".to_string()],
            insufficient_data_actions: vec![],
        }
    }

    fn window_search() -> SearchMethod {
        SearchMethod::DatapointPeriod(TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 8, 4, 5, 16, 0).unwrap(),
        ))
    }

    fn render(entries: &[LogEntry], enrichment: Option<&AlarmDetails>) -> NotificationReport {
        let event = event();
        let binding = binding();
        ReportFormatter::format(&ReportContext {
            event: &event,
            binding: &binding,
            search: window_search(),
            entries,
            account_id: "123456789012",
            region: "ap-northeast-1",
            enrichment,
        })
    }

    #[test]
    fn should_render_subject_with_region_long_name() {
        let report = render(&[], None);

        assert_eq!(
            report.subject,
            "ALARM: \"LS-AWSLAB-EC2-MTA01-App-Error-Alarm\" in Asia Pacific (Tokyo)"
        );
    }

    #[test]
    fn should_list_at_most_five_entries_with_omitted_count() {
        // Arrange
        let entries: Vec<LogEntry> = (0..8)
            .map(|i| LogEntry::new(1_754_284_560_000 + i, format!("ERROR line {}", i)))
            .collect();

        // Act
        let report = render(&entries, None);

        // Assert
        assert!(report.body.contains("8 件のエラーが検出されました:"));
        assert!(report.body.contains("5. 2025-08-04 05:16:00"));
        assert!(!report.body.contains("6. "));
        assert!(report.body.contains("... 他 3 件のエラーログがあります"));
    }

    #[test]
    fn should_truncate_long_messages() {
        // Arrange
        let long = "x".repeat(MAX_MESSAGE_CHARS + 50);
        let entries = vec![LogEntry::new(1_754_284_560_000, long)];

        // Act
        let report = render(&entries, None);

        // Assert
        let expected = format!("{}...", "x".repeat(MAX_MESSAGE_CHARS));
        assert!(report.body.contains(&expected));
        assert!(!report.body.contains(&"x".repeat(MAX_MESSAGE_CHARS + 1)));
    }

    #[test]
    fn should_render_placeholders_without_data() {
        let report = render(&[], None);

        assert!(report.body.contains(RETRIEVAL_FAILED_PLACEHOLDER));
        assert!(report.body.contains(THRESHOLD_PLACEHOLDER));
        assert!(report.body.contains(METRIC_PLACEHOLDER));
        assert!(report.body.contains(ACTIONS_PLACEHOLDER));
        assert!(report.body.contains(UNSUBSCRIBE_NOTE));
    }

    #[test]
    fn should_keep_section_order_regardless_of_data() {
        // Arrange
        let headings = [
            "You are receiving this email",
            LOG_BLOCK_HEADING,
            "View this alarm in the AWS Management Console:",
            "Alarm Details:",
            "Threshold:",
            "Monitored Metric:",
            "State Change Actions:",
            "Note: Do not use",
        ];
        let entries = vec![LogEntry::new(1_754_284_560_000, "ERROR boom")];
        let details = details();

        for report in [render(&[], None), render(&entries, Some(&details))] {
            // Act
            let positions: Vec<usize> = headings
                .iter()
                .map(|h| report.body.find(h).unwrap_or_else(|| panic!("missing {}", h)))
                .collect();

            // Assert
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn should_render_enrichment_blocks() {
        let details = details();

        let report = render(&[], Some(&details));

        assert!(report.body.contains(
            "- The alarm is in the ALARM state when the metric is GreaterThanOrEqualToThreshold 1 for at least 1 of the last 1 period(s) of 300 seconds."
        ));
        assert!(report.body.contains("MetricNamespace:"));
        assert!(report.body.contains("EC2-MTA01-App-Error"));
        assert!(report.body.contains("- ALARM: [arn:aws:sns:ap-northeast-1:123456789012:processing]"));
        assert!(report.body.contains("- OK: []"));
    }

    #[test]
    fn should_render_alarm_metadata() {
        let report = render(&[], None);

        assert!(report.body.contains("OK -> ALARM"));
        assert!(report.body.contains("123456789012"));
        assert!(report.body.contains("Asia Pacific (Tokyo)"));
        assert!(report.body.contains("application errors"));
    }

    #[test]
    fn should_encode_alarm_name_in_console_link() {
        // Arrange
        let mut event = event();
        event.name = "My Alarm/Prod".to_string();
        let binding = binding();

        // Act
        let report = ReportFormatter::format(&ReportContext {
            event: &event,
            binding: &binding,
            search: SearchMethod::Recent { hours_back: 1 },
            entries: &[],
            account_id: "",
            region: "ap-northeast-1",
            enrichment: None,
        });

        // Assert
        assert!(report.body.contains("#alarmsV2:alarm/My%20Alarm%2FProd"));
        assert!(report.body.contains("log-group/LS-AWSLAB-EC2-MTA01-Log-app"));
        assert!(report.body.contains("・検索範囲: 過去1時間"));
        assert!(report.body.contains("(not provided)"));
    }

    #[test]
    fn should_describe_datapoint_search_window() {
        let report = render(&[], None);

        assert!(report
            .body
            .contains("メトリクス期間（5分間、2025-08-04 05:16:00 UTC から）"));
    }

    #[tokio::test]
    async fn should_return_none_when_enrichment_query_fails() {
        // Arrange
        let mut alarms = MockAlarmClientTrait::new();
        alarms
            .expect_describe_alarm()
            .returning(|_| Err(AppError::metadata("AccessDenied")));

        // Act
        let result = fetch_enrichment(&alarms, "Foo-Alarm").await;

        // Assert
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_return_details_when_enrichment_succeeds() {
        let mut alarms = MockAlarmClientTrait::new();
        alarms
            .expect_describe_alarm()
            .returning(|_| Ok(Some(details())));

        let result = fetch_enrichment(&alarms, "Foo-Alarm").await;

        assert_eq!(result.and_then(|d| d.period), Some(300));
    }
}
