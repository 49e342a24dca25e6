//! Inbound envelope parsing
//!
//! The function is invoked either by the notification transport, which wraps one or
//! more alarm payloads as JSON strings inside `Records`, or directly with the alarm
//! payload itself. The shape is decided once here.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::utils::AppError;

use super::AlarmEvent;

/// `EventSource` value of records delivered by the notification transport
pub const SNS_EVENT_SOURCE: &str = "aws:sns";

/// One transport-wrapped message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Embedded alarm payload (a JSON document as a string)
    pub message: String,
}

impl RawMessage {
    /// Parse the embedded payload as an alarm event
    pub fn to_alarm_event(&self) -> Result<AlarmEvent, AppError> {
        let value: serde_json::Value = serde_json::from_str(&self.message).map_err(|e| {
            AppError::invalid_event(format!("Wrapped message is not valid JSON: {}", e))
        })?;
        AlarmEvent::from_value(&value)
    }
}

/// Accepted inbound shapes
#[derive(Debug, Clone)]
pub enum InboundEnvelope {
    Wrapped(Vec<RawMessage>),
    Direct(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecords {
    records: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecord {
    #[serde(default)]
    event_source: Option<String>,
    #[serde(default)]
    sns: Option<RawSns>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSns {
    message: String,
}

impl InboundEnvelope {
    /// Decide the envelope shape.
    ///
    /// Records from any other event source are skipped. A record from the
    /// notification transport without a message body is an invalid event.
    pub fn parse(payload: serde_json::Value) -> Result<Self, AppError> {
        if payload.get("Records").is_none() {
            return Ok(InboundEnvelope::Direct(payload));
        }

        let raw: RawRecords = serde_json::from_value(payload)
            .map_err(|e| AppError::invalid_event(format!("Malformed Records envelope: {}", e)))?;

        let mut messages = Vec::with_capacity(raw.records.len());
        for (index, record) in raw.records.into_iter().enumerate() {
            let source = record.event_source.unwrap_or_default();
            if source != SNS_EVENT_SOURCE {
                warn!(index, event_source = %source, "Skipping record from unsupported event source");
                continue;
            }
            let sns = record.sns.ok_or_else(|| {
                AppError::invalid_event(format!("Record {} has no Sns section", index))
            })?;
            messages.push(RawMessage {
                message: sns.message,
            });
        }

        debug!(count = messages.len(), "Unwrapped transport records");
        Ok(InboundEnvelope::Wrapped(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_direct_payload() {
        // Arrange
        let payload = json!({ "AlarmName": "Foo-Alarm", "NewStateValue": "OK" });

        // Act
        let envelope = InboundEnvelope::parse(payload.clone()).unwrap();

        // Assert
        match envelope {
            InboundEnvelope::Direct(value) => assert_eq!(value, payload),
            other => panic!("Expected Direct, got {:?}", other),
        }
    }

    #[test]
    fn should_unwrap_sns_records_in_order() {
        // Arrange
        let payload = json!({
            "Records": [
                { "EventSource": "aws:sns", "Sns": { "Message": "{\"AlarmName\":\"A\"}" } },
                { "EventSource": "aws:sqs", "Body": "ignored" },
                { "EventSource": "aws:sns", "Sns": { "Message": "{\"AlarmName\":\"B\"}" } }
            ]
        });

        // Act
        let envelope = InboundEnvelope::parse(payload).unwrap();

        // Assert
        match envelope {
            InboundEnvelope::Wrapped(messages) => {
                assert_eq!(messages.len(), 2);
                assert!(messages[0].message.contains("\"A\""));
                assert!(messages[1].message.contains("\"B\""));
            }
            other => panic!("Expected Wrapped, got {:?}", other),
        }
    }

    #[test]
    fn should_reject_sns_record_without_message() {
        let payload = json!({ "Records": [ { "EventSource": "aws:sns" } ] });

        let result = InboundEnvelope::parse(payload);

        assert!(matches!(result, Err(AppError::InvalidEvent(_))));
    }

    #[test]
    fn should_fail_when_wrapped_message_is_not_json() {
        // Arrange
        let message = RawMessage {
            message: "not json".to_string(),
        };

        // Act
        let result = message.to_alarm_event();

        // Assert
        assert!(matches!(result, Err(AppError::InvalidEvent(_))));
    }
}
