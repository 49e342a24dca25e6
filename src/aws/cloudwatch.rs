use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::MetricAlarm;
use aws_sdk_cloudwatch::Client;
use tracing::{error, instrument};

use crate::utils::AppError;

use super::client::AlarmClientTrait;
use super::model::AlarmDetails;

/// Alarm metadata client backed by the platform SDK
#[derive(Clone)]
pub struct CloudWatchAlarmClient {
    client: Client,
}

impl CloudWatchAlarmClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn to_details(alarm: &MetricAlarm) -> AlarmDetails {
    AlarmDetails {
        threshold: alarm.threshold(),
        comparison_operator: alarm.comparison_operator().map(|c| c.as_str().to_string()),
        evaluation_periods: alarm.evaluation_periods(),
        datapoints_to_alarm: alarm.datapoints_to_alarm(),
        period: alarm.period(),
        statistic: alarm
            .statistic()
            .map(|s| s.as_str().to_string())
            .or_else(|| alarm.extended_statistic().map(str::to_string)),
        namespace: alarm.namespace().map(str::to_string),
        metric_name: alarm.metric_name().map(str::to_string),
        unit: alarm.unit().map(|u| u.as_str().to_string()),
        treat_missing_data: alarm.treat_missing_data().map(str::to_string),
        metric_query_count: alarm.metrics().len(),
        ok_actions: alarm.ok_actions().to_vec(),
        alarm_actions: alarm.alarm_actions().to_vec(),
        insufficient_data_actions: alarm.insufficient_data_actions().to_vec(),
    }
}

#[async_trait::async_trait]
impl AlarmClientTrait for CloudWatchAlarmClient {
    #[instrument(skip(self))]
    async fn describe_alarm(&self, alarm_name: &str) -> Result<Option<AlarmDetails>, AppError> {
        let output = self
            .client
            .describe_alarms()
            .alarm_names(alarm_name)
            .send()
            .await
            .map_err(|e| {
                error!(error = %DisplayErrorContext(&e), "DescribeAlarms failed");
                AppError::metadata(format!(
                    "Failed to describe alarm {}: {}",
                    alarm_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.metric_alarms().first().map(to_details))
    }
}
