//! 이벤트 포매터 -- 매칭 이벤트를 현지화된 알림 메시지로 변환
//!
//! 시그니처가 캡처한 UTC 타임스탬프를 설정된 타임존으로 변환하고,
//! 번역 테이블을 적용하여 Telegram HTML 마크업 메시지를 조립합니다.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use authtail_core::locale::Translations;

use crate::dispatch::MatchEvent;
use crate::error::MonitorError;
use crate::signature::{ErrorSignature, ResourceType};

/// 리소스 값이 캡처되지 않았을 때 표시하는 대체 문자열
const MISSING_RESOURCE: &str = "N/A";

/// 현지 시각 표기 형식 (`01/03/2024 11:15:30 CET`)
const LOCAL_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S %Z";

/// 조립된 알림 페이로드
///
/// `text`가 전송되는 전문이며, 나머지 필드는 로그 컨텍스트용입니다.
/// 전송 후 폐기되는 일시적 데이터로, 재시도 큐는 없습니다.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    /// 전송할 메시지 전문 (HTML 마크업 포함)
    pub text: String,
    /// 변환된 현지 시각 표기
    pub local_time: String,
    /// 번역된 실패 사유
    pub reason: String,
    /// 리소스 레이블 (이메일/리소스)
    pub resource_label: String,
    /// 리소스 값
    pub resource_value: String,
    /// 출발지 IP
    pub source_ip: String,
}

/// 이벤트 포매터
///
/// 번역 테이블과 타임존은 생성 시점에 고정되며 이후 불변입니다.
pub struct EventFormatter {
    /// 번역 테이블
    translations: Translations,
    /// 현지 시각 변환에 사용할 타임존
    timezone: Tz,
}

impl EventFormatter {
    /// 새 포매터를 생성합니다.
    pub fn new(translations: Translations, timezone: Tz) -> Self {
        Self {
            translations,
            timezone,
        }
    }

    /// 설정된 타임존을 반환합니다.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// 매칭 이벤트를 알림 페이로드로 변환합니다.
    ///
    /// # Errors
    /// - 캡처된 타임스탬프가 파싱되지 않는 경우
    /// - 필수 캡처 필드가 없는 경우 (디스패처가 보장하므로 정상 경로에선 발생하지 않음)
    pub fn format(
        &self,
        event: &MatchEvent,
        signature: &ErrorSignature,
    ) -> Result<NotificationPayload, MonitorError> {
        let datetime_raw =
            event
                .fields
                .get("datetime")
                .ok_or_else(|| MonitorError::MissingField {
                    signature_id: event.signature_id.clone(),
                    field: "datetime".to_owned(),
                })?;

        // `Z` 접미사를 명시적 UTC 오프셋으로 치환한 뒤 파싱
        let datetime_utc = DateTime::parse_from_rfc3339(&datetime_raw.replace('Z', "+00:00"))
            .map_err(|e| MonitorError::Format {
                signature_id: event.signature_id.clone(),
                reason: format!("invalid timestamp '{datetime_raw}': {e}"),
            })?;

        let local_time = datetime_utc
            .with_timezone(&self.timezone)
            .format(LOCAL_TIME_FORMAT)
            .to_string();

        let source_ip = event
            .fields
            .get("ip")
            .ok_or_else(|| MonitorError::MissingField {
                signature_id: event.signature_id.clone(),
                field: "ip".to_owned(),
            })?
            .clone();

        let resource_value = event
            .fields
            .get(&signature.notification_key)
            .cloned()
            .unwrap_or_else(|| MISSING_RESOURCE.to_owned());

        let reason = self
            .translations
            .error_reason(&event.signature_id)
            .to_owned();

        let (resource_icon, resource_label) = match signature.resource_type {
            ResourceType::Email => ("📧", self.translations.text("tg_email")),
            ResourceType::Other => ("🔑", self.translations.text("tg_recurso")),
        };

        let text = format!(
            "🚨 <b>{}</b>\n\n\
             📅 <b>{}:</b> {}\n\
             ❌ <b>{}:</b> {}\n\
             {} <b>{}:</b> {}\n\
             🌐 <b>{}:</b> {}",
            self.translations.text("tg_intento"),
            self.translations.text("tg_fecha_hora"),
            local_time,
            self.translations.text("tg_motivo"),
            reason,
            resource_icon,
            resource_label,
            resource_value,
            self.translations.text("tg_ip"),
            source_ip,
        );

        Ok(NotificationPayload {
            text,
            local_time,
            reason,
            resource_label: resource_label.to_owned(),
            resource_value,
            source_ip,
        })
    }

    /// 모니터 시작 알림 메시지를 조립합니다.
    pub fn startup_message(&self, version: &str, started_at: DateTime<Utc>) -> String {
        let local_start = started_at
            .with_timezone(&self.timezone)
            .format(LOCAL_TIME_FORMAT);

        format!(
            "✅ <b>{}</b> <i>v{}</i>\n\n\
             📁 {}\n\
             🕐 {}: {}\n\
             🌍 {}: {}",
            self.translations.text("tg_monitor"),
            version,
            self.translations.text("tg_monitoreando"),
            self.translations.text("tg_iniciado"),
            local_start,
            self.translations.text("tg_zona_horaria"),
            self.timezone.name(),
        )
    }
}
