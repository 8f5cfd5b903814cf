//! 에러 타입 — 도메인별 에러 정의

/// Authtail 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AuthtailError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로케일/번역 테이블 에러
    #[error("locale error: {0}")]
    Locale(#[from] LocaleError),

    /// 모니터 엔진 에러
    #[error("monitor error: {0}")]
    Monitor(String),

    /// 알림 전송 에러
    #[error("notify error: {0}")]
    Notify(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로케일/번역 테이블 에러
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// 로케일 파일을 읽을 수 없음
    #[error("locale file unreadable: {path}: {reason}")]
    FileUnreadable { path: String, reason: String },

    /// 로케일 파일 파싱 실패
    #[error("failed to parse locale file: {path}: {reason}")]
    ParseFailed { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "general.timezone".to_owned(),
            reason: "unknown IANA name".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("general.timezone"));
        assert!(msg.contains("unknown IANA name"));
    }

    #[test]
    fn locale_error_display() {
        let err = LocaleError::ParseFailed {
            path: "/etc/authtail/locale/es.json".to_owned(),
            reason: "trailing comma".to_owned(),
        };
        assert!(err.to_string().contains("es.json"));
    }

    #[test]
    fn config_error_converts_to_authtail_error() {
        let err = ConfigError::FileNotFound {
            path: "/etc/authtail/authtail.toml".to_owned(),
        };
        let top: AuthtailError = err.into();
        assert!(matches!(top, AuthtailError::Config(_)));
    }

    #[test]
    fn io_error_converts_to_authtail_error() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let top: AuthtailError = err.into();
        assert!(matches!(top, AuthtailError::Io(_)));
    }
}
