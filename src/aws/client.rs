use std::sync::Arc;

use crate::monitoring::LogEntry;
use crate::utils::AppError;

use super::model::{AlarmDetails, LogQuery, MetricFilterInfo};

/// 로그 서비스 클라이언트 인터페이스
///
/// 메트릭 필터 조회, 로그 소스 조회, 로그 이벤트 검색을 추상화하여
/// 테스트에서 Mock 객체로 대체할 수 있습니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LogsClientTrait: Send + Sync {
    /// (namespace, metric name)에 연결된 메트릭 필터 조회
    async fn metric_filters_for_metric(
        &self,
        namespace: &str,
        metric_name: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError>;

    /// 로그 소스에 설정된 메트릭 필터 조회
    async fn metric_filters_for_source(
        &self,
        source_id: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError>;

    /// 이름이 정확히 일치하는 로그 소스 존재 여부
    async fn source_exists(&self, source_id: &str) -> Result<bool, AppError>;

    /// 시간 범위와 패턴으로 로그 이벤트 검색
    async fn filter_log_events(&self, query: &LogQuery) -> Result<Vec<LogEntry>, AppError>;
}

/// 알람 메타데이터 클라이언트 인터페이스
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AlarmClientTrait: Send + Sync {
    /// 이름으로 알람 설정 조회 (없으면 None)
    async fn describe_alarm(&self, alarm_name: &str) -> Result<Option<AlarmDetails>, AppError>;
}

/// 알림 발행 클라이언트 인터페이스
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PublishClientTrait: Send + Sync {
    /// 메시지 발행 후 메시지 ID 반환
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str)
        -> Result<String, AppError>;
}

/// Arc로 래핑된 클라이언트 (Clone 지원)
pub type LogsClient = Arc<dyn LogsClientTrait>;
pub type AlarmClient = Arc<dyn AlarmClientTrait>;
pub type PublishClient = Arc<dyn PublishClientTrait>;
