//! 모니터 엔진 에러 타입
//!
//! [`MonitorError`]는 모니터 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<MonitorError> for AuthtailError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use authtail_core::error::AuthtailError;

/// 모니터 엔진 도메인 에러
///
/// 시그니처 로딩/컴파일, 파일 테일링, 이벤트 포맷팅 등
/// 엔진 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// 시그니처 파일 로딩 실패
    #[error("signature load error: {path}: {reason}")]
    SignatureLoad {
        /// 시그니처 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 시그니처 유효성 검증 실패
    #[error("signature validation error: signature '{id}': {reason}")]
    SignatureValidation {
        /// 문제가 된 시그니처 ID
        id: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 파일 읽기 실패 (해당 사이클은 건너뛰고 오프셋은 유지)
    #[error("tail read error: {path}: {reason}")]
    TailRead {
        /// 감시 대상 파일 경로
        path: String,
        /// 읽기 실패 사유
        reason: String,
    },

    /// 이벤트 포맷팅 실패 (해당 이벤트는 드롭)
    #[error("format error: signature '{signature_id}': {reason}")]
    Format {
        /// 매칭된 시그니처 ID
        signature_id: String,
        /// 포맷팅 실패 사유
        reason: String,
    },

    /// 매칭 결과에 필수 캡처 필드가 없음
    #[error("missing capture field '{field}' for signature '{signature_id}'")]
    MissingField {
        /// 매칭된 시그니처 ID
        signature_id: String,
        /// 없는 필드명
        field: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<MonitorError> for AuthtailError {
    fn from(err: MonitorError) -> Self {
        AuthtailError::Monitor(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_load_error_display() {
        let err = MonitorError::SignatureLoad {
            path: "/etc/authtail/signatures.json".to_owned(),
            reason: "invalid JSON".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("signatures.json"));
        assert!(msg.contains("invalid JSON"));
    }

    #[test]
    fn missing_field_error_display() {
        let err = MonitorError::MissingField {
            signature_id: "invalid_credentials".to_owned(),
            field: "ip".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid_credentials"));
        assert!(msg.contains("'ip'"));
    }

    #[test]
    fn converts_to_authtail_error() {
        let err = MonitorError::Config {
            field: "poll_interval_secs".to_owned(),
            reason: "must be greater than 0".to_owned(),
        };
        let top: AuthtailError = err.into();
        assert!(matches!(top, AuthtailError::Monitor(_)));
    }
}
