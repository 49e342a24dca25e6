//! Alarm-to-notification pipeline
//!
//! - Datapoint timestamp extraction from the alarm reason
//! - Filter pattern normalization
//! - Alarm to log source resolution
//! - Time-window log retrieval
//! - Report formatting and publishing
//! - Event dispatch

pub mod dispatcher;
pub mod fetcher;
pub mod formatter;
pub mod model;
pub mod notifier;
pub mod pattern;
pub mod region;
pub mod resolver;
pub mod timestamp;

pub use dispatcher::{EventDispatcher, InvocationResult};
pub use fetcher::LogWindowFetcher;
pub use formatter::{ReportContext, ReportFormatter};
pub use model::{LogEntry, NotificationReport, SearchMethod, SourceBinding, TimeWindow};
pub use notifier::Notifier;
pub use pattern::normalize;
pub use resolver::SourceResolver;
pub use timestamp::{extract, extract_iso};
