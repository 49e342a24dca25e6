use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use tracing::{error, info, instrument};

use crate::utils::AppError;

use super::client::PublishClientTrait;

/// Longest subject the notification service accepts
pub const MAX_SUBJECT_CHARS: usize = 99;

/// Notification channel client backed by the platform SDK
#[derive(Clone)]
pub struct SnsPublishClient {
    client: Client,
}

impl SnsPublishClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

/// Subjects must be a single line under the service limit
pub fn sanitize_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}

#[async_trait::async_trait]
impl PublishClientTrait for SnsPublishClient {
    #[instrument(skip(self, body))]
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, AppError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(sanitize_subject(subject))
            .message(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %DisplayErrorContext(&e), "Publish failed");
                AppError::publish(format!("Failed to publish notification: {}", DisplayErrorContext(&e)))
            })?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        info!(message_id = %message_id, "Notification published");
        Ok(message_id)
    }
}
