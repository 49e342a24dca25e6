//! Platform clients
//!
//! Each outbound dependency sits behind a trait so the pipeline can run against
//! mocks in tests:
//! - `LogsClientTrait`: metric filter metadata, log source lookup, log queries
//! - `AlarmClientTrait`: live alarm configuration
//! - `PublishClientTrait`: notification channel

pub mod client;
pub mod cloudwatch;
pub mod logs;
pub mod model;
pub mod sns;

pub use client::{
    AlarmClient, AlarmClientTrait, LogsClient, LogsClientTrait, PublishClient, PublishClientTrait,
};
pub use cloudwatch::CloudWatchAlarmClient;
pub use logs::CloudWatchLogsClient;
pub use model::{AlarmDetails, LogQuery, MetricFilterInfo};
pub use sns::SnsPublishClient;

/// Shared platform configuration, loaded once at process start.
pub async fn load_sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
