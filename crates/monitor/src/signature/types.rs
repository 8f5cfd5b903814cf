//! 시그니처 데이터 타입
//!
//! JSON 시그니처 파일에서 역직렬화되는 구조체들을 정의합니다.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// 에러 시그니처 -- 하나의 인증 실패 로그 형태에 대응합니다.
///
/// `pattern`은 공유 타임스탬프 접두 패턴 뒤에 이어붙는 부분 정규식이며,
/// 반드시 `ip` 네임드 캡처와 알림에 표시할 리소스 캡처
/// (`notification_key`가 가리키는 그룹)를 포함해야 합니다.
///
/// # JSON 스키마
/// ```json
/// {
///   "invalid_credentials": {
///     "pattern": "invalid credentials email=(?P<email>\\S+) ip=(?P<ip>[0-9.]+)",
///     "notification_key": "email",
///     "resource_type": "email"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSignature {
    /// 시그니처 고유 ID (문서 내에서 유일, 리로드 간 안정적)
    #[serde(skip)]
    pub id: String,
    /// 타임스탬프 접두 패턴 뒤에 붙는 부분 정규식
    pub pattern: String,
    /// 알림에 표시할 리소스 값을 담은 캡처 그룹 이름
    pub notification_key: String,
    /// 리소스 종류 (알림 아이콘/레이블 선택)
    #[serde(default)]
    pub resource_type: ResourceType,
}

impl ErrorSignature {
    /// 시그니처의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.id.is_empty() {
            return Err(MonitorError::SignatureValidation {
                id: "(empty)".to_owned(),
                reason: "signature id must not be empty".to_owned(),
            });
        }

        if self.id.len() > 256 {
            return Err(MonitorError::SignatureValidation {
                id: self.id.clone(),
                reason: "signature id must not exceed 256 characters".to_owned(),
            });
        }

        if self.pattern.is_empty() {
            return Err(MonitorError::SignatureValidation {
                id: self.id.clone(),
                reason: "pattern must not be empty".to_owned(),
            });
        }

        if self.notification_key.is_empty() {
            return Err(MonitorError::SignatureValidation {
                id: self.id.clone(),
                reason: "notification_key must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// 리소스 종류 -- 알림 아이콘과 레이블을 결정합니다.
///
/// 알 수 없는 값은 `Other`로 역직렬화됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// 이메일 주소 (이메일 아이콘/레이블)
    Email,
    /// 그 외 리소스 (일반 리소스 아이콘/레이블)
    #[default]
    #[serde(other)]
    Other,
}
