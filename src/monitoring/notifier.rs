//! Notification delivery
//!
//! Publishes the formatted report to the notification channel. There is no retry:
//! a rejected publish fails the event.

use tracing::{error, info, instrument};

use crate::aws::PublishClient;
use crate::utils::AppError;

use super::model::NotificationReport;

/// Notifier for the downstream channel
#[derive(Clone)]
pub struct Notifier {
    publisher: PublishClient,
}

impl Notifier {
    pub fn new(publisher: PublishClient) -> Self {
        Self { publisher }
    }

    /// Publish a message and return its message id.
    ///
    /// # Errors
    /// Returns `AppError::Publish` if the channel rejects the message.
    #[instrument(skip(self, body))]
    pub async fn publish(
        &self,
        channel_id: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, AppError> {
        let message_id = self
            .publisher
            .publish(channel_id, subject, body)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to publish notification");
                match e {
                    AppError::Publish(_) => e,
                    other => AppError::publish(other.message()),
                }
            })?;

        info!(message_id = %message_id, "Notification sent successfully");
        Ok(message_id)
    }

    /// Publish a formatted report
    pub async fn send_report(
        &self,
        channel_id: &str,
        report: &NotificationReport,
    ) -> Result<String, AppError> {
        self.publish(channel_id, &report.subject, &report.body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::client::MockPublishClientTrait;
    use std::sync::Arc;

    #[tokio::test]
    async fn should_return_message_id_on_success() {
        // Arrange
        let mut publisher = MockPublishClientTrait::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|topic, subject, body| {
                assert_eq!(topic, "arn:topic");
                assert_eq!(subject, "ALARM: \"Foo\" in Asia Pacific (Tokyo)");
                assert!(body.contains("hello"));
                Ok("msg-1".to_string())
            });
        let notifier = Notifier::new(Arc::new(publisher));

        // Act
        let result = notifier
            .publish("arn:topic", "ALARM: \"Foo\" in Asia Pacific (Tokyo)", "hello")
            .await;

        // Assert
        assert_eq!(result.unwrap(), "msg-1");
    }

    #[tokio::test]
    async fn should_fail_with_publish_error() {
        // Arrange
        let mut publisher = MockPublishClientTrait::new();
        publisher
            .expect_publish()
            .returning(|_, _, _| Err(AppError::metadata("AuthorizationError")));
        let notifier = Notifier::new(Arc::new(publisher));
        let report = NotificationReport {
            subject: "s".to_string(),
            body: "b".to_string(),
        };

        // Act
        let result = notifier.send_report("arn:topic", &report).await;

        // Assert
        match result {
            Err(AppError::Publish(msg)) => assert_eq!(msg, "AuthorizationError"),
            other => panic!("Expected Publish error, got {:?}", other),
        }
    }
}
