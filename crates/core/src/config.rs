//! 설정 관리 — authtail.toml 파싱 및 런타임 설정
//!
//! [`AuthtailConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`AUTHTAIL_MONITOR_LOG_PATH=/log/app.log` 형식)
//! 2. 설정 파일 (`authtail.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), authtail_core::error::AuthtailError> {
//! use authtail_core::config::AuthtailConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AuthtailConfig::load("authtail.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AuthtailConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AuthtailError, ConfigError};

/// Authtail 통합 설정
///
/// `authtail.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthtailConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 모니터 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Telegram 알림 설정
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl AuthtailConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AuthtailError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthtailError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AuthtailError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AuthtailError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AuthtailError> {
        toml::from_str(toml_str).map_err(|e| {
            AuthtailError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `AUTHTAIL_{SECTION}_{FIELD}`
    /// 예: `AUTHTAIL_GENERAL_TIMEZONE=Europe/Madrid`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "AUTHTAIL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "AUTHTAIL_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.language, "AUTHTAIL_GENERAL_LANGUAGE");
        override_string(&mut self.general.timezone, "AUTHTAIL_GENERAL_TIMEZONE");

        // Monitor
        override_string(&mut self.monitor.log_path, "AUTHTAIL_MONITOR_LOG_PATH");
        override_u64(
            &mut self.monitor.poll_interval_secs,
            "AUTHTAIL_MONITOR_POLL_INTERVAL_SECS",
        );
        override_u64(
            &mut self.monitor.reload_interval_secs,
            "AUTHTAIL_MONITOR_RELOAD_INTERVAL_SECS",
        );
        override_string(
            &mut self.monitor.signatures_path,
            "AUTHTAIL_MONITOR_SIGNATURES_PATH",
        );
        override_string(&mut self.monitor.locale_dir, "AUTHTAIL_MONITOR_LOCALE_DIR");

        // Telegram
        override_bool(&mut self.telegram.enabled, "AUTHTAIL_TELEGRAM_ENABLED");
        override_string(&mut self.telegram.bot_token, "AUTHTAIL_TELEGRAM_BOT_TOKEN");
        override_i64(&mut self.telegram.chat_id, "AUTHTAIL_TELEGRAM_CHAT_ID");
        override_string(&mut self.telegram.api_base, "AUTHTAIL_TELEGRAM_API_BASE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AuthtailError> {
        const MAX_POLL_INTERVAL_SECS: u64 = 3600; // 1 hour
        const MAX_RELOAD_INTERVAL_SECS: u64 = 86_400; // 1 day

        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // language 검증
        if self.general.language.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.language".to_owned(),
                reason: "language must not be empty".to_owned(),
            }
            .into());
        }

        // timezone 검증: IANA 이름이 파싱 가능해야 함
        if self.general.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "general.timezone".to_owned(),
                reason: format!("unknown IANA timezone: '{}'", self.general.timezone),
            }
            .into());
        }

        // log_path 검증
        if self.monitor.log_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.log_path".to_owned(),
                reason: "log path must not be empty".to_owned(),
            }
            .into());
        }
        if !Path::new(&self.monitor.log_path).is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.log_path".to_owned(),
                reason: format!(
                    "log path '{}' must be an absolute path",
                    self.monitor.log_path
                ),
            }
            .into());
        }

        if self.monitor.poll_interval_secs == 0
            || self.monitor.poll_interval_secs > MAX_POLL_INTERVAL_SECS
        {
            return Err(ConfigError::InvalidValue {
                field: "monitor.poll_interval_secs".to_owned(),
                reason: format!("must be 1-{}", MAX_POLL_INTERVAL_SECS),
            }
            .into());
        }

        // reload_interval_secs == 0 은 리로드 비활성화를 의미
        if self.monitor.reload_interval_secs > MAX_RELOAD_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "monitor.reload_interval_secs".to_owned(),
                reason: format!("must be 0 (disabled) or 1-{}", MAX_RELOAD_INTERVAL_SECS),
            }
            .into());
        }

        if self.monitor.signatures_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.signatures_path".to_owned(),
                reason: "signatures path must not be empty".to_owned(),
            }
            .into());
        }

        if self.telegram.enabled && self.telegram.api_base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "telegram.api_base".to_owned(),
                reason: "api base must not be empty when telegram is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 알림 언어 (로케일 파일 이름, 예: ES, EN)
    pub language: String,
    /// 알림 시각 변환에 사용할 IANA 타임존
    pub timezone: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            language: "ES".to_owned(),
            timezone: "Europe/Madrid".to_owned(),
        }
    }
}

/// 로그 모니터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 감시할 로그 파일 경로 (심볼릭 링크 가능)
    pub log_path: String,
    /// 파일 상태 체크 주기 (초)
    pub poll_interval_secs: u64,
    /// 시그니처 리로드 주기 (초, 0이면 비활성화)
    pub reload_interval_secs: u64,
    /// 시그니처 정의 파일 경로
    pub signatures_path: String,
    /// 로케일 파일 디렉토리
    pub locale_dir: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_path: "/log/pangolin.log".to_owned(),
            poll_interval_secs: 5,
            reload_interval_secs: 300,
            signatures_path: "/etc/authtail/signatures.json".to_owned(),
            locale_dir: "/etc/authtail/locale".to_owned(),
        }
    }
}

/// Telegram 알림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// 알림 활성화 여부
    pub enabled: bool,
    /// Bot API 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: i64,
    /// Bot API 베이스 URL (테스트용 오버라이드 지원)
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
            chat_id: 0,
            api_base: "https://api.telegram.org".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AuthtailConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_minimal_toml() {
        let config = AuthtailConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.monitor.poll_interval_secs, 5);
        assert!(config.telegram.enabled);
    }

    #[test]
    fn parse_partial_sections() {
        let toml = r#"
[general]
log_level = "debug"
timezone = "America/Argentina/Buenos_Aires"

[monitor]
poll_interval_secs = 10
"#;
        let config = AuthtailConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.timezone, "America/Argentina/Buenos_Aires");
        assert_eq!(config.monitor.poll_interval_secs, 10);
        // 나머지 필드는 기본값
        assert_eq!(config.monitor.log_path, "/log/pangolin.log");
        assert_eq!(config.general.language, "ES");
    }

    #[test]
    fn parse_rejects_malformed_toml() {
        let result = AuthtailConfig::parse("[general\nlog_level = ");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let mut config = AuthtailConfig::default();
        config.general.log_level = "verbose".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_timezone() {
        let mut config = AuthtailConfig::default();
        config.general.timezone = "Mars/Olympus_Mons".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut config = AuthtailConfig::default();
        config.monitor.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_allows_zero_reload_interval() {
        let mut config = AuthtailConfig::default();
        config.monitor.reload_interval_secs = 0;
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_relative_log_path() {
        let mut config = AuthtailConfig::default();
        config.monitor.log_path = "logs/app.log".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_language() {
        let mut config = AuthtailConfig::default();
        config.general.language = String::new();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn from_file_missing_returns_file_not_found() {
        let result = AuthtailConfig::from_file("/nonexistent/authtail.toml").await;
        assert!(matches!(
            result,
            Err(AuthtailError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
