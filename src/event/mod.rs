//! Inbound alarm events
//!
//! - Alarm state-change event model (`AlarmEvent`, `AlarmState`, `Trigger`)
//! - Envelope parsing (transport-wrapped records or a direct payload)

pub mod envelope;

#[allow(clippy::module_inception)]
mod event_types;

pub use envelope::{InboundEnvelope, RawMessage, SNS_EVENT_SOURCE};
pub use event_types::{AlarmEvent, AlarmState, MetricRef, Trigger, TriggerMetric};
