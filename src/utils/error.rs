use thiserror::Error;

use crate::config::ConfigError;

/// 애플리케이션 전역 에러 타입
///
/// 호출 경계(dispatcher)까지 올라온 에러는 모두 500 결과로 변환됩니다.
/// `Retrieval`은 fetcher 내부에서 복구되므로 경계까지 올라오지 않습니다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("resolution error: {0}")]
    Resolution(String),
    #[error("retrieval error: {0}")]
    Retrieval(String),
    #[error("metadata error: {0}")]
    Metadata(String),
    #[error("publish error: {0}")]
    Publish(String),
}

impl AppError {
    /// 에러 메시지 반환
    pub fn message(&self) -> String {
        match self {
            AppError::Configuration(msg)
            | AppError::InvalidEvent(msg)
            | AppError::Resolution(msg)
            | AppError::Retrieval(msg)
            | AppError::Metadata(msg)
            | AppError::Publish(msg) => msg.clone(),
        }
    }

    /// 에러 코드 반환
    pub fn error_code(&self) -> String {
        match self {
            AppError::Configuration(_) => "RELAY001",
            AppError::InvalidEvent(_) => "RELAY002",
            AppError::Resolution(_) => "RELAY003",
            AppError::Retrieval(_) => "RELAY004",
            AppError::Metadata(_) => "RELAY005",
            AppError::Publish(_) => "RELAY006",
        }
        .to_string()
    }

    /// 호출 결과 상태 코드 반환
    pub fn status_code(&self) -> u16 {
        500
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// 편의 함수들
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        AppError::InvalidEvent(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        AppError::Resolution(msg.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        AppError::Retrieval(msg.into())
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        AppError::Metadata(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        AppError::Publish(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_distinct_error_codes() {
        // Arrange
        let errors = [
            AppError::configuration("a"),
            AppError::invalid_event("b"),
            AppError::resolution("c"),
            AppError::retrieval("d"),
            AppError::metadata("e"),
            AppError::publish("f"),
        ];

        // Act
        let mut codes: Vec<String> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort();
        codes.dedup();

        // Assert
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn should_prefix_display_with_category() {
        // Arrange
        let error = AppError::resolution("no metric filters matched");

        // Act & Assert
        assert_eq!(error.to_string(), "resolution error: no metric filters matched");
        assert_eq!(error.message(), "no metric filters matched");
        assert_eq!(error.status_code(), 500);
    }

    #[test]
    fn should_convert_config_error_into_configuration_error() {
        // Arrange
        let config_error = ConfigError::MissingTopicArn;

        // Act
        let error: AppError = config_error.into();

        // Assert
        assert!(matches!(error, AppError::Configuration(_)));
        assert!(error.message().contains("EMAIL_SNS_TOPIC_ARN"));
    }
}
