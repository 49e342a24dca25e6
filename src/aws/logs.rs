use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::MetricFilter;
use aws_sdk_cloudwatchlogs::Client;
use tracing::{debug, error, instrument};

use crate::monitoring::LogEntry;
use crate::utils::AppError;

use super::client::LogsClientTrait;
use super::model::{LogQuery, MetricFilterInfo};

/// Log service client backed by the platform SDK
#[derive(Clone)]
pub struct CloudWatchLogsClient {
    client: Client,
}

impl CloudWatchLogsClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn to_filter_info(filter: &MetricFilter) -> MetricFilterInfo {
    MetricFilterInfo {
        filter_name: filter.filter_name().unwrap_or_default().to_string(),
        log_group_name: filter.log_group_name().unwrap_or_default().to_string(),
        filter_pattern: filter.filter_pattern().unwrap_or_default().to_string(),
    }
}

#[async_trait::async_trait]
impl LogsClientTrait for CloudWatchLogsClient {
    #[instrument(skip(self))]
    async fn metric_filters_for_metric(
        &self,
        namespace: &str,
        metric_name: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError> {
        let mut filters = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_metric_filters()
                .metric_namespace(namespace)
                .metric_name(metric_name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    error!(error = %DisplayErrorContext(&e), "DescribeMetricFilters by metric failed");
                    AppError::metadata(format!(
                        "Failed to describe metric filters for {}/{}: {}",
                        namespace,
                        metric_name,
                        DisplayErrorContext(&e)
                    ))
                })?;

            filters.extend(output.metric_filters().iter().map(to_filter_info));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(count = filters.len(), "Metric filters found for metric");
        Ok(filters)
    }

    #[instrument(skip(self))]
    async fn metric_filters_for_source(
        &self,
        source_id: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError> {
        let mut filters = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_metric_filters()
                .log_group_name(source_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    error!(error = %DisplayErrorContext(&e), "DescribeMetricFilters by log group failed");
                    AppError::metadata(format!(
                        "Failed to describe metric filters for {}: {}",
                        source_id,
                        DisplayErrorContext(&e)
                    ))
                })?;

            filters.extend(output.metric_filters().iter().map(to_filter_info));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(filters)
    }

    #[instrument(skip(self))]
    async fn source_exists(&self, source_id: &str) -> Result<bool, AppError> {
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_log_groups()
                .log_group_name_prefix(source_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    error!(error = %DisplayErrorContext(&e), "DescribeLogGroups failed");
                    AppError::metadata(format!(
                        "Failed to describe log groups with prefix {}: {}",
                        source_id,
                        DisplayErrorContext(&e)
                    ))
                })?;

            if output
                .log_groups()
                .iter()
                .any(|group| group.log_group_name() == Some(source_id))
            {
                return Ok(true);
            }

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(false),
            }
        }
    }

    #[instrument(skip(self), fields(source_id = %query.source_id))]
    async fn filter_log_events(&self, query: &LogQuery) -> Result<Vec<LogEntry>, AppError> {
        let mut request = self
            .client
            .filter_log_events()
            .log_group_name(&query.source_id)
            .start_time(query.start_millis)
            // the service treats endTime as inclusive
            .end_time(query.end_millis - 1)
            .limit(query.limit);

        if !query.filter_pattern.is_empty() {
            request = request.filter_pattern(&query.filter_pattern);
        }

        let output = request.send().await.map_err(|e| {
            AppError::retrieval(format!(
                "Failed to filter log events in {}: {}",
                query.source_id,
                DisplayErrorContext(&e)
            ))
        })?;

        Ok(output
            .events()
            .iter()
            .map(|event| LogEntry {
                timestamp_millis: event.timestamp().unwrap_or_default(),
                message: event.message().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
