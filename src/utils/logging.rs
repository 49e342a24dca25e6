//! 로깅 초기화 모듈
//!
//! JSON 형식의 구조화된 로깅을 제공합니다.
//! 실행 플랫폼이 stdout을 로그 저장소로 수집하므로 stdout에만 출력합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 로깅 시스템을 초기화합니다.
///
/// JSON 포맷으로 로그를 출력하며, 환경 변수 `RUST_LOG`를 통해 로그 레벨을 설정할 수 있습니다.
/// 기본값은 `info,alarm_relay=debug`입니다.
pub fn init_logging() {
    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false)
        .with_ansi(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,alarm_relay=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .try_init()
        .or_else(|err| {
            // Detect "already initialized" via source downcasting
            use std::error::Error;
            if err
                .source()
                .and_then(|s| s.downcast_ref::<tracing::dispatcher::SetGlobalDefaultError>())
                .is_some()
            {
                return Ok(());
            }
            eprintln!("Failed to initialize tracing: {}", err);
            Err(err)
        })
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_ignore_repeated_initialization() {
        // Act
        init_logging();
        init_logging();

        // Assert
        tracing::info!("logging still works after a second init");
    }
}
