//! Invocation entry point
//!
//! Unwraps the inbound envelope and drives each alarm through
//! resolve -> extract -> fetch -> format -> publish.
//! Wrapped messages are processed strictly in order; the first failure aborts
//! the rest of the batch.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::aws::{AlarmClient, LogsClient, PublishClient};
use crate::config::AppConfig;
use crate::event::{AlarmEvent, InboundEnvelope};
use crate::utils::AppError;

use super::fetcher::{LogWindowFetcher, DEFAULT_HOURS_BACK};
use super::formatter::{fetch_enrichment, ReportContext, ReportFormatter};
use super::model::{SearchMethod, TimeWindow};
use super::notifier::Notifier;
use super::resolver::SourceResolver;
use super::timestamp;

pub const SUCCESS_MESSAGE: &str = "Error notification processed successfully";
const UNKNOWN_ACCOUNT: &str = "unknown";

/// Structured invocation result.
///
/// `body` is a JSON-encoded string `{"message": ...}`, the shape proxy-style
/// invokers expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

fn message_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}

impl InvocationResult {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: message_body(SUCCESS_MESSAGE),
        }
    }

    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: message_body(&format!("Error: {}", message)),
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        Self {
            status_code: err.status_code(),
            body: message_body(&format!("Error: {}", err)),
        }
    }

    /// The `message` field decoded from the body; empty if the body is not an object.
    pub fn message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Event dispatcher
pub struct EventDispatcher {
    config: AppConfig,
    resolver: SourceResolver,
    fetcher: LogWindowFetcher,
    alarms: AlarmClient,
    notifier: Notifier,
}

impl EventDispatcher {
    /// Create a dispatcher from configuration and platform clients
    pub fn new(
        config: AppConfig,
        logs: LogsClient,
        alarms: AlarmClient,
        publisher: PublishClient,
    ) -> Self {
        let resolver = SourceResolver::new(
            logs.clone(),
            config.source_table.clone(),
            config.alarm_name_prefix.clone(),
        );
        Self {
            resolver,
            fetcher: LogWindowFetcher::new(logs),
            alarms,
            notifier: Notifier::new(publisher),
            config,
        }
    }

    /// Handle one invocation payload. Never fails; errors become a 500 result.
    pub async fn handle(&self, payload: Value) -> InvocationResult {
        debug!(event = %payload, "Received event");

        match self.dispatch(payload).await {
            Ok(()) => {
                info!("Invocation processed successfully");
                InvocationResult::success()
            }
            Err(e) => {
                error!(
                    error = %e,
                    error_code = %e.error_code(),
                    "Invocation failed"
                );
                InvocationResult::from_error(&e)
            }
        }
    }

    async fn dispatch(&self, payload: Value) -> Result<(), AppError> {
        match InboundEnvelope::parse(payload)? {
            InboundEnvelope::Wrapped(messages) => {
                info!(count = messages.len(), "Processing wrapped messages");
                for (index, message) in messages.iter().enumerate() {
                    let event = message.to_alarm_event()?;
                    self.process_alarm(&event).await.map_err(|e| {
                        error!(index, alarm_name = %event.name, error = %e, "Aborting batch");
                        e
                    })?;
                }
                Ok(())
            }
            InboundEnvelope::Direct(value) => {
                let event = AlarmEvent::from_value(&value)?;
                self.process_alarm(&event).await?;
                Ok(())
            }
        }
    }

    /// Run one alarm through the pipeline.
    ///
    /// Returns the published message id, or `None` when the alarm is not in ALARM state.
    #[instrument(skip(self, event), fields(alarm_name = %event.name))]
    pub async fn process_alarm(&self, event: &AlarmEvent) -> Result<Option<String>, AppError> {
        if !event.new_state.is_alarm() {
            info!(state = %event.new_state, "Alarm is not in ALARM state, skipping");
            return Ok(None);
        }

        let binding = self.resolver.resolve(event).await?;

        // without a datapoint timestamp, search the last hour
        let (search, entries) = match timestamp::extract(&event.reason_text) {
            Some(start) => {
                let window = TimeWindow::new(start);
                info!(start = %start, "Extracted datapoint timestamp");
                let entries = self
                    .fetcher
                    .fetch_window(&binding.source_id, &binding.filter_expression, &window)
                    .await;
                (SearchMethod::DatapointPeriod(window), entries)
            }
            None => {
                info!("No datapoint timestamp in reason, searching recent logs");
                let entries = self
                    .fetcher
                    .fetch_recent(&binding.source_id, &binding.filter_expression, DEFAULT_HOURS_BACK)
                    .await;
                (
                    SearchMethod::Recent {
                        hours_back: DEFAULT_HOURS_BACK,
                    },
                    entries,
                )
            }
        };
        info!(count = entries.len(), "Log entries retrieved");

        let enrichment = fetch_enrichment(self.alarms.as_ref(), &event.name).await;
        let account_id = event
            .resolved_account_id()
            .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string());

        let report = ReportFormatter::format(&ReportContext {
            event,
            binding: &binding,
            search,
            entries: &entries,
            account_id: &account_id,
            region: &self.config.region,
            enrichment: enrichment.as_ref(),
        });
        info!(subject = %report.subject, "Formatted notification");

        let message_id = self
            .notifier
            .send_report(&self.config.notification_topic_arn, &report)
            .await?;
        Ok(Some(message_id))
    }
}
