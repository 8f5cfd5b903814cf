//! Authtail daemon -- 설정 로딩, 컴포넌트 조립, 모니터 루프 실행

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use authtail_core::config::AuthtailConfig;
use authtail_core::error::{AuthtailError, ConfigError};
use authtail_core::locale::Translations;
use authtail_monitor::{LogMonitorBuilder, MonitorConfig, SignatureRegistry};
use authtail_notify::TelegramNotifier;

/// 설정 파일 기본 경로 (`AUTHTAIL_CONFIG` 환경변수로 오버라이드)
const DEFAULT_CONFIG_PATH: &str = "/etc/authtail/authtail.toml";

/// 설정 파일을 로드합니다.
///
/// 파일이 없으면 기본값 + 환경변수만으로 구동합니다 (환경변수 전용 배포 지원).
/// 반환되는 bool은 파일이 없어 기본값으로 대체했는지 여부입니다.
async fn load_config(path: &str) -> Result<(AuthtailConfig, bool)> {
    match AuthtailConfig::load(path).await {
        Ok(config) => Ok((config, false)),
        Err(AuthtailError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = AuthtailConfig::default();
            config.apply_env_overrides();
            config
                .validate()
                .context("invalid configuration from defaults + environment")?;
            Ok((config, true))
        }
        Err(e) => Err(e).with_context(|| format!("failed to load config from {path}")),
    }
}

/// 로깅을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 그 값을 그대로 쓰고,
/// 없으면 설정 파일의 로그 레벨에서 필터를 구성합니다.
fn init_logging(config: &AuthtailConfig) {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("{},authtail=debug", config.general.log_level));

    match config.general.log_format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var("AUTHTAIL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let (config, config_file_missing) = load_config(&config_path).await?;

    init_logging(&config);
    authtail_core::metrics::describe_all();

    // 이 실행을 식별하는 짧은 run id를 모든 로그 라인에 붙임
    let run_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    let span = tracing::info_span!("authtail", run_id = %run_id);

    run(config, config_file_missing, &config_path)
        .instrument(span)
        .await
}

async fn run(config: AuthtailConfig, config_file_missing: bool, config_path: &str) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_path = config.monitor.log_path.as_str(),
        timezone = config.general.timezone.as_str(),
        language = config.general.language.as_str(),
        poll_interval_secs = config.monitor.poll_interval_secs,
        "authtail-daemon starting"
    );

    if config_file_missing {
        tracing::warn!(
            path = config_path,
            "config file not found, running from defaults + environment"
        );
    }

    // Telegram 자격 증명 검증 (활성화 상태에서 누락 시 시작 중단)
    if config.telegram.enabled
        && (config.telegram.bot_token.is_empty() || config.telegram.chat_id == 0)
    {
        anyhow::bail!(
            "telegram is enabled but bot_token/chat_id are not configured \
             (set AUTHTAIL_TELEGRAM_BOT_TOKEN and AUTHTAIL_TELEGRAM_CHAT_ID, \
             or disable with AUTHTAIL_TELEGRAM_ENABLED=false)"
        );
    }

    // 번역 테이블 로드 (내장 테이블까지 실패한 경우에만 시작 중단)
    let translations = Translations::load(&config.monitor.locale_dir, &config.general.language)
        .await
        .context("failed to load translation tables")?;
    tracing::info!(language = translations.language(), "translations ready");

    // 초기 시그니처 로드 (실패는 빈 레지스트리로 강등, 리로드 주기에 재시도)
    let registry = match SignatureRegistry::load(&config.monitor.signatures_path).await {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!(
                path = config.monitor.signatures_path.as_str(),
                error = %e,
                "failed to load signatures, starting with empty registry"
            );
            SignatureRegistry::empty()
        }
    };
    if registry.is_empty() {
        tracing::warn!("no signatures loaded, monitor is a no-op until a successful reload");
    } else {
        tracing::info!(signatures = ?registry.ids(), "signatures ready");
    }

    let notifier = TelegramNotifier::from_config(&config.telegram);
    if !notifier.is_enabled() {
        tracing::warn!("telegram notifier disabled, notifications will be discarded");
    }

    let monitor_config =
        MonitorConfig::from_core(&config)?.with_version(env!("CARGO_PKG_VERSION"));

    let mut monitor = LogMonitorBuilder::new()
        .config(monitor_config)
        .registry(registry)
        .translations(translations)
        .notifier(notifier)
        .build()
        .context("failed to build log monitor")?;

    tracing::info!("log monitor initialized");

    // 모니터 루프 실행, 종료 시그널 대기
    let cancel = CancellationToken::new();
    let monitor_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        monitor.run(monitor_cancel).await;
        monitor
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    // 우아한 종료: 진행 중인 사이클이 끝난 뒤 루프가 반환됨
    cancel.cancel();
    let monitor = handle.await.context("monitor task panicked")?;

    tracing::info!(
        lines_scanned = monitor.lines_scanned(),
        matches_found = monitor.matches_found(),
        notifications_sent = monitor.notifications_sent(),
        notify_failures = monitor.notify_failures(),
        "authtail-daemon shut down"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[serial_test::serial]
    async fn load_config_falls_back_to_defaults_when_file_missing() {
        let (config, missing) = load_config("/definitely/missing/authtail.toml")
            .await
            .unwrap();
        assert!(missing);
        assert_eq!(config.general.log_level, "info");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn load_config_reads_file_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authtail.toml");
        std::fs::write(&path, "[general]\nlog_level = \"warn\"\n").unwrap();

        let (config, missing) = load_config(path.to_str().unwrap()).await.unwrap();
        assert!(!missing);
        assert_eq!(config.general.log_level, "warn");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn load_config_applies_env_overrides_without_file() {
        unsafe {
            std::env::set_var("AUTHTAIL_GENERAL_LOG_LEVEL", "trace");
        }

        let (config, missing) = load_config("/definitely/missing/authtail.toml")
            .await
            .unwrap();
        assert!(missing);
        assert_eq!(config.general.log_level, "trace");

        unsafe {
            std::env::remove_var("AUTHTAIL_GENERAL_LOG_LEVEL");
        }
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authtail.toml");
        std::fs::write(&path, "[general]\nlog_level = \"loudest\"\n").unwrap();

        assert!(load_config(path.to_str().unwrap()).await.is_err());
    }
}
