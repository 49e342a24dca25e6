use std::env;

use super::source_table::SourceTable;

/// 기본 리전
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// 레거시 알람 이름 접두사 기본값
pub const DEFAULT_ALARM_NAME_PREFIX: &str = "LS-AWSLAB";

/// 애플리케이션 설정
///
/// 프로세스 시작 시 한 번 로드되어 dispatcher에 전달됩니다.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 알림 발행 대상 토픽 ARN
    pub notification_topic_arn: String,
    /// 링크/제목에 사용되는 리전 토큰
    pub region: String,
    /// 레거시 정적 소스 테이블
    pub source_table: SourceTable,
    /// 레거시 알람 이름 접두사
    pub alarm_name_prefix: String,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로부터 설정 로드
    ///
    /// 빈 문자열은 설정되지 않은 것으로 취급합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let notification_topic_arn = get("EMAIL_SNS_TOPIC_ARN").ok_or(ConfigError::MissingTopicArn)?;

        let region = get("AWS_REGION").unwrap_or_else(|| {
            tracing::debug!("AWS_REGION 환경변수가 설정되지 않아 기본 리전을 사용합니다.");
            DEFAULT_REGION.to_string()
        });

        let source_table = match get("LOG_GROUPS_CONFIG") {
            Some(raw) => SourceTable::from_json(&raw)
                .map_err(|e| ConfigError::InvalidSourceTable(e.to_string()))?,
            None => SourceTable::default(),
        };

        let alarm_name_prefix =
            get("ALARM_NAME_PREFIX").unwrap_or_else(|| DEFAULT_ALARM_NAME_PREFIX.to_string());

        Ok(Self {
            notification_topic_arn,
            region,
            source_table,
            alarm_name_prefix,
        })
    }

    /// 테스트 및 로컬 실행용 최소 설정
    pub fn new(notification_topic_arn: impl Into<String>) -> Self {
        Self {
            notification_topic_arn: notification_topic_arn.into(),
            region: DEFAULT_REGION.to_string(),
            source_table: SourceTable::default(),
            alarm_name_prefix: DEFAULT_ALARM_NAME_PREFIX.to_string(),
        }
    }

    pub fn with_source_table(mut self, source_table: SourceTable) -> Self {
        self.source_table = source_table;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("EMAIL_SNS_TOPIC_ARN environment variable is required")]
    MissingTopicArn,
    #[error("Invalid LOG_GROUPS_CONFIG format: {0}")]
    InvalidSourceTable(String),
}
