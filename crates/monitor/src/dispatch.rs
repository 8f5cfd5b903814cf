//! 매치 디스패처 -- 라인별 시그니처 매칭 및 캡처 필드 추출
//!
//! 레지스트리 순서대로 시그니처를 평가하며, 처음 매칭된 시그니처가
//! 선택됩니다 (first-match-wins). 라인당 최대 하나의 이벤트만 생성됩니다.

use std::collections::HashMap;

use crate::signature::SignatureRegistry;

/// 매칭 이벤트 -- 하나의 매칭된 라인에서 추출된 구조화된 필드
///
/// 생성 즉시 포매터에 소비되는 일시적 데이터이며, 어디에도 저장되지 않습니다.
#[derive(Debug, Clone)]
pub struct MatchEvent {
    /// 매칭된 시그니처 ID
    pub signature_id: String,
    /// 네임드 캡처 그룹에서 추출된 필드 (이름 -> 값)
    pub fields: HashMap<String, String>,
    /// 매칭된 원본 라인
    pub raw_line: String,
}

/// 매치 디스패처
///
/// 검색(search) 시맨틱으로 매칭하며 라인 전체 앵커는 없습니다.
/// 타임스탬프 접두 패턴은 컴파일 시점에 모든 시그니처에 포함되어 있습니다.
pub struct MatchDispatcher;

impl MatchDispatcher {
    /// 모든 매칭 결과에 반드시 존재해야 하는 캡처 필드
    ///
    /// `datetime`은 공유 접두 패턴이 보장하고, `ip`는 시그니처 작성 규칙이
    /// 요구합니다. 누락된 매칭은 포맷팅 단계로 전파하지 않고 여기서 버립니다.
    pub const REQUIRED_FIELDS: [&'static str; 2] = ["datetime", "ip"];

    /// 라인을 레지스트리의 시그니처 순서대로 평가합니다.
    ///
    /// 처음 매칭된 시그니처의 캡처 필드로 [`MatchEvent`]를 생성합니다.
    /// 어떤 시그니처도 매칭되지 않거나, 매칭 결과에 필수 필드가 없으면
    /// `None`을 반환합니다.
    pub fn dispatch(line: &str, registry: &SignatureRegistry) -> Option<MatchEvent> {
        for compiled in registry.iter() {
            let Some(caps) = compiled.regex().captures(line) else {
                continue;
            };

            let mut fields = HashMap::new();
            for name in compiled.regex().capture_names().flatten() {
                if let Some(value) = caps.name(name) {
                    fields.insert(name.to_owned(), value.as_str().to_owned());
                }
            }

            for required in Self::REQUIRED_FIELDS {
                if !fields.contains_key(required) {
                    tracing::warn!(
                        signature_id = compiled.id(),
                        field = required,
                        line,
                        "match missing required capture field, dropping"
                    );
                    return None;
                }
            }

            return Some(MatchEvent {
                signature_id: compiled.id().to_owned(),
                fields,
                raw_line: line.to_owned(),
            });
        }

        None
    }
}
