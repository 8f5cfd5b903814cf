//! Telegram Bot API 전송자
//!
//! `sendMessage` 엔드포인트로 HTML parse mode 메시지를 전송합니다.
//! 전송 실패(전송 계층 에러, non-2xx 응답)는 이 경계 밖으로 전파되지 않고
//! `false` 반환과 에러 로그로 표현됩니다.

use std::time::Duration;

use serde::Serialize;

use authtail_core::config::TelegramConfig;
use authtail_core::notifier::Notifier;

use crate::error::NotifyError;

/// 요청 타임아웃 -- 전송이 느려도 다음 폴링 사이클을 무한정 막지 않도록 제한
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `sendMessage` 요청 본문
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    /// 메시지를 받을 채팅 ID
    chat_id: i64,
    /// 메시지 본문
    text: &'a str,
    /// 파싱 모드 (HTML 고정)
    parse_mode: &'static str,
}

/// Telegram 알림 전송자
///
/// # 사용 예시
/// ```ignore
/// use authtail_notify::TelegramNotifier;
///
/// let notifier = TelegramNotifier::new("123456:ABCDEF", 424242);
/// let delivered = notifier.send("🚨 <b>alert</b>").await;
/// ```
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    /// Bot API 토큰
    token: String,
    /// 메시지를 받을 채팅 ID
    chat_id: i64,
    /// Bot API 베이스 URL (테스트에서 로컬 스텁으로 교체 가능)
    api_base: String,
    /// HTTP 클라이언트
    client: reqwest::Client,
    /// 비활성화 시 메시지를 조용히 버림
    enabled: bool,
}

impl TelegramNotifier {
    /// 새 전송자를 생성합니다.
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            token: token.into(),
            chat_id,
            api_base: "https://api.telegram.org".to_owned(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            enabled: true,
        }
    }

    /// core 설정에서 전송자를 생성합니다.
    pub fn from_config(config: &TelegramConfig) -> Self {
        let mut notifier = Self::new(config.bot_token.clone(), config.chat_id)
            .with_api_base(config.api_base.clone());
        notifier.enabled = config.enabled;
        notifier
    }

    /// 비활성화된 전송자를 생성합니다 (테스트/개발용).
    ///
    /// `send`는 항상 성공을 보고하며 메시지는 버려집니다.
    pub fn disabled() -> Self {
        let mut notifier = Self::new(String::new(), 0);
        notifier.enabled = false;
        notifier
    }

    /// Bot API 베이스 URL을 교체합니다.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// 전송이 활성화되어 있는지 확인합니다.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.token.is_empty()
    }

    /// 현재 Bot API 베이스 URL을 반환합니다.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `sendMessage` 요청을 전송합니다.
    async fn post_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessageRequest {
            chat_id: self.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api { status, body });
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &str) -> bool {
        if !self.is_enabled() {
            tracing::debug!("telegram notifier disabled, discarding message");
            return true;
        }

        match self.post_message(message).await {
            Ok(()) => {
                tracing::debug!(chat_id = self.chat_id, "telegram message delivered");
                true
            }
            Err(e) => {
                tracing::error!(
                    chat_id = self.chat_id,
                    error = %e,
                    "failed to deliver telegram message"
                );
                false
            }
        }
    }
}
