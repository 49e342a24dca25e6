use std::sync::Arc;

use alarm_relay::aws::{self, CloudWatchAlarmClient, CloudWatchLogsClient, SnsPublishClient};
use alarm_relay::utils::init_logging;
use alarm_relay::{AppConfig, AppError, EventDispatcher, InvocationResult};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화
    init_logging();

    // 3. 설정 로드
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // 런타임은 띄우고 호출마다 실패를 반환
            let err = AppError::from(e);
            tracing::error!(error = %err, "Failed to load configuration");
            let err = &err;
            return lambda_runtime::run(service_fn(move |_: LambdaEvent<Value>| async move {
                Ok::<_, Error>(InvocationResult::from_error(err))
            }))
            .await;
        }
    };

    // 4. 클라이언트 생성
    let sdk_config = aws::load_sdk_config(&config.region).await;
    let dispatcher = EventDispatcher::new(
        config,
        Arc::new(CloudWatchLogsClient::new(&sdk_config)),
        Arc::new(CloudWatchAlarmClient::new(&sdk_config)),
        Arc::new(SnsPublishClient::new(&sdk_config)),
    );

    // 5. 런타임 실행
    tracing::info!("Alarm relay ready");
    let dispatcher = &dispatcher;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(dispatcher.handle(event.payload).await)
    }))
    .await
}
