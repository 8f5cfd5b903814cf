//! 알림 전송 에러 타입

use authtail_core::error::AuthtailError;

/// 알림 전송 도메인 에러
///
/// `Notifier::send` 경계 밖으로는 전파되지 않으며, 전송자 내부에서
/// 로그로 소비됩니다.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP 전송 계층 에러 (연결 실패, 타임아웃 등)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bot API가 non-2xx 응답을 반환
    #[error("telegram api error: status {status}: {body}")]
    Api {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문
        body: String,
    },
}

impl From<NotifyError> for AuthtailError {
    fn from(err: NotifyError) -> Self {
        AuthtailError::Notify(err.to_string())
    }
}
