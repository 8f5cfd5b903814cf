//! 모니터 엔진 설정
//!
//! [`MonitorConfig`]는 core의 [`AuthtailConfig`](authtail_core::config::AuthtailConfig)를
//! 기반으로 엔진 내부에서 사용하는 파싱 완료된 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use authtail_core::config::AuthtailConfig;
//! use authtail_monitor::config::MonitorConfig;
//!
//! let core_config = AuthtailConfig::default();
//! let config = MonitorConfig::from_core(&core_config)?;
//! ```

use std::path::PathBuf;

use chrono_tz::Tz;

use authtail_core::config::AuthtailConfig;

use crate::error::MonitorError;

/// 모니터 엔진 설정
///
/// core 설정에서 파생되며, 타임존은 파싱된 형태로 보관합니다.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// 감시할 로그 파일 경로
    pub log_path: PathBuf,
    /// 파일 상태 체크 주기 (초)
    pub poll_interval_secs: u64,
    /// 시그니처 리로드 주기 (초, 0이면 비활성화)
    pub reload_interval_secs: u64,
    /// 시그니처 정의 파일 경로
    pub signatures_path: PathBuf,
    /// 현지 시각 변환에 사용할 타임존
    pub timezone: Tz,
    /// 시작 알림에 표시할 버전 문자열
    pub version: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("/log/pangolin.log"),
            poll_interval_secs: 5,
            reload_interval_secs: 300,
            signatures_path: PathBuf::from("/etc/authtail/signatures.json"),
            timezone: chrono_tz::Europe::Madrid,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl MonitorConfig {
    /// core의 `AuthtailConfig`에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &AuthtailConfig) -> Result<Self, MonitorError> {
        let timezone = core
            .general
            .timezone
            .parse::<Tz>()
            .map_err(|_| MonitorError::Config {
                field: "general.timezone".to_owned(),
                reason: format!("unknown IANA timezone: '{}'", core.general.timezone),
            })?;

        Ok(Self {
            log_path: PathBuf::from(&core.monitor.log_path),
            poll_interval_secs: core.monitor.poll_interval_secs,
            reload_interval_secs: core.monitor.reload_interval_secs,
            signatures_path: PathBuf::from(&core.monitor.signatures_path),
            timezone,
            ..Self::default()
        })
    }

    /// 버전 문자열을 설정합니다 (데몬이 자기 버전으로 덮어씀).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MonitorError> {
        const MAX_POLL_INTERVAL_SECS: u64 = 3600;

        if self.log_path.as_os_str().is_empty() {
            return Err(MonitorError::Config {
                field: "log_path".to_owned(),
                reason: "log path must not be empty".to_owned(),
            });
        }

        if self.poll_interval_secs == 0 || self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(MonitorError::Config {
                field: "poll_interval_secs".to_owned(),
                reason: format!("must be 1-{}", MAX_POLL_INTERVAL_SECS),
            });
        }

        if self.signatures_path.as_os_str().is_empty() {
            return Err(MonitorError::Config {
                field: "signatures_path".to_owned(),
                reason: "signatures path must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}
