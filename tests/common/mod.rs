//! 통합 테스트용 Fake 클라이언트
//!
//! 호출 인자를 기록해 두었다가 테스트에서 검증합니다.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alarm_relay::aws::{
    AlarmClientTrait, AlarmDetails, LogQuery, LogsClientTrait, MetricFilterInfo, PublishClientTrait,
};
use alarm_relay::config::AppConfig;
use alarm_relay::monitoring::LogEntry;
use alarm_relay::{AppError, EventDispatcher};

pub const TOPIC_ARN: &str = "arn:aws:sns:ap-northeast-1:123456789012:error-alerts";

pub fn filter(log_group_name: &str, filter_pattern: &str) -> MetricFilterInfo {
    MetricFilterInfo {
        filter_name: format!("{}-filter", log_group_name),
        log_group_name: log_group_name.to_string(),
        filter_pattern: filter_pattern.to_string(),
    }
}

/// 로그 서비스 Fake
#[derive(Default)]
pub struct FakeLogs {
    by_metric: HashMap<(String, String), Vec<MetricFilterInfo>>,
    by_source: HashMap<String, Vec<MetricFilterInfo>>,
    existing: HashSet<String>,
    query_error: Option<String>,
    entries: Vec<LogEntry>,
    pub queries: Mutex<Vec<LogQuery>>,
    pub metric_lookups: Mutex<Vec<(String, String)>>,
}

impl FakeLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metric_filter(
        mut self,
        namespace: &str,
        metric_name: &str,
        filter: MetricFilterInfo,
    ) -> Self {
        self.by_metric
            .entry((namespace.to_string(), metric_name.to_string()))
            .or_default()
            .push(filter);
        self
    }

    pub fn with_source(mut self, source_id: &str, filters: Vec<MetricFilterInfo>) -> Self {
        self.existing.insert(source_id.to_string());
        self.by_source.insert(source_id.to_string(), filters);
        self
    }

    pub fn with_entries(mut self, entries: Vec<LogEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn failing_queries(mut self, message: &str) -> Self {
        self.query_error = Some(message.to_string());
        self
    }

    pub fn recorded_queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LogsClientTrait for FakeLogs {
    async fn metric_filters_for_metric(
        &self,
        namespace: &str,
        metric_name: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError> {
        let key = (namespace.to_string(), metric_name.to_string());
        self.metric_lookups.lock().unwrap().push(key.clone());
        Ok(self.by_metric.get(&key).cloned().unwrap_or_default())
    }

    async fn metric_filters_for_source(
        &self,
        source_id: &str,
    ) -> Result<Vec<MetricFilterInfo>, AppError> {
        Ok(self.by_source.get(source_id).cloned().unwrap_or_default())
    }

    async fn source_exists(&self, source_id: &str) -> Result<bool, AppError> {
        Ok(self.existing.contains(source_id))
    }

    async fn filter_log_events(&self, query: &LogQuery) -> Result<Vec<LogEntry>, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.query_error {
            Some(message) => Err(AppError::retrieval(message.clone())),
            None => Ok(self.entries.clone()),
        }
    }
}

/// 알람 메타데이터 Fake
#[derive(Default)]
pub struct FakeAlarms {
    details: Option<AlarmDetails>,
    fail: bool,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_details(mut self, details: AlarmDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait::async_trait]
impl AlarmClientTrait for FakeAlarms {
    async fn describe_alarm(&self, alarm_name: &str) -> Result<Option<AlarmDetails>, AppError> {
        self.lookups.lock().unwrap().push(alarm_name.to_string());
        if self.fail {
            return Err(AppError::metadata("AccessDenied"));
        }
        Ok(self.details.clone())
    }
}

/// 발행된 메시지
#[derive(Debug, Clone)]
pub struct Published {
    pub topic_arn: String,
    pub subject: String,
    pub body: String,
}

/// 알림 발행 Fake
#[derive(Default)]
pub struct FakePublisher {
    error: Option<String>,
    pub published: Mutex<Vec<Published>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PublishClientTrait for FakePublisher {
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<String, AppError> {
        if let Some(message) = &self.error {
            return Err(AppError::publish(message.clone()));
        }
        let mut published = self.published.lock().unwrap();
        published.push(Published {
            topic_arn: topic_arn.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(format!("msg-{}", published.len()))
    }
}

/// Fake 묶음과 dispatcher
pub struct Harness {
    pub logs: Arc<FakeLogs>,
    pub alarms: Arc<FakeAlarms>,
    pub publisher: Arc<FakePublisher>,
    pub dispatcher: EventDispatcher,
}

impl Harness {
    pub fn new(config: AppConfig, logs: FakeLogs, alarms: FakeAlarms, publisher: FakePublisher) -> Self {
        let logs = Arc::new(logs);
        let alarms = Arc::new(alarms);
        let publisher = Arc::new(publisher);
        let dispatcher = EventDispatcher::new(
            config,
            logs.clone(),
            alarms.clone(),
            publisher.clone(),
        );
        Self {
            logs,
            alarms,
            publisher,
            dispatcher,
        }
    }

    pub fn with_defaults(logs: FakeLogs) -> Self {
        Self::new(
            AppConfig::new(TOPIC_ARN),
            logs,
            FakeAlarms::new(),
            FakePublisher::new(),
        )
    }
}
