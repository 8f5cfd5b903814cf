//! 시그니처 레지스트리 -- 인증 실패 패턴 정의 로딩 및 정규식 컴파일
//!
//! JSON 문서에서 시그니처 정의를 로드하고, 공유 타임스탬프 접두 패턴과
//! 결합한 정규식을 로드 시점에 한 번만 컴파일합니다.
//!
//! # 시그니처 형식
//! ```json
//! {
//!   "invalid_credentials": {
//!     "pattern": "invalid credentials email=(?P<email>\\S+) ip=(?P<ip>[0-9.]+)",
//!     "notification_key": "email",
//!     "resource_type": "email"
//!   }
//! }
//! ```
//!
//! # 아키텍처
//! - [`SignatureRegistry`]: 컴파일된 시그니처의 순서 있는 스냅샷
//! - [`loader`]: JSON 파일 로딩 및 항목별 유효성 검증
//! - [`types`]: 시그니처 데이터 구조 정의

pub mod loader;
pub mod types;

pub use loader::SignatureLoader;
pub use types::{ErrorSignature, ResourceType};

use std::path::Path;

use regex::Regex;

use crate::error::MonitorError;

/// 공유 타임스탬프 접두 패턴
///
/// 모든 시그니처는 밀리초 정밀도의 ISO-8601 UTC 타임스탬프(`Z` 접미사)로
/// 시작하는 라인에만 매칭됩니다. 타임스탬프와 시그니처 본문 사이의 간격은
/// non-greedy로 건너뜁니다.
pub const TIMESTAMP_PREFIX: &str =
    r"(?P<datetime>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z).*?";

/// 컴파일된 시그니처 -- 정의 + 전체 정규식
///
/// 한 번 컴파일되면 불변입니다.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    /// 원본 시그니처 정의
    signature: ErrorSignature,
    /// `TIMESTAMP_PREFIX + pattern`으로 컴파일된 정규식
    regex: Regex,
}

impl CompiledSignature {
    /// 시그니처 정의를 컴파일합니다.
    pub fn compile(signature: ErrorSignature) -> Result<Self, MonitorError> {
        let full_pattern = format!("{TIMESTAMP_PREFIX}{}", signature.pattern);
        let regex = Regex::new(&full_pattern).map_err(|e| MonitorError::SignatureValidation {
            id: signature.id.clone(),
            reason: format!("invalid regex: {e}"),
        })?;
        Ok(Self { signature, regex })
    }

    /// 시그니처 ID를 반환합니다.
    pub fn id(&self) -> &str {
        &self.signature.id
    }

    /// 시그니처 정의를 반환합니다.
    pub fn signature(&self) -> &ErrorSignature {
        &self.signature
    }

    /// 컴파일된 정규식을 반환합니다.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// 시그니처 레지스트리 -- 컴파일된 시그니처의 순서 있는 스냅샷
///
/// 순서는 시그니처 문서의 키 순서이며, 디스패처의 first-match-wins
/// 우선순위를 결정합니다. 스냅샷은 생성 후 불변이며, 리로드는
/// 새 스냅샷으로의 교체로 표현됩니다.
#[derive(Debug, Default)]
pub struct SignatureRegistry {
    /// 문서 순서대로 정렬된 컴파일된 시그니처
    signatures: Vec<CompiledSignature>,
}

impl SignatureRegistry {
    /// 빈 레지스트리를 생성합니다.
    ///
    /// 빈 레지스트리는 유효하며, 디스패치는 항상 no-match가 됩니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 시그니처 정의 목록을 컴파일하여 레지스트리를 생성합니다.
    ///
    /// 컴파일에 실패한 시그니처는 경고 로그를 남기고 건너뜁니다.
    /// 실패는 시그니처 단위로 격리되며 전체 로드를 중단하지 않습니다.
    pub fn compile(definitions: Vec<ErrorSignature>) -> Self {
        let mut signatures = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let id = definition.id.clone();
            match CompiledSignature::compile(definition) {
                Ok(compiled) => signatures.push(compiled),
                Err(e) => {
                    tracing::warn!(
                        signature_id = %id,
                        error = %e,
                        "failed to compile signature pattern, skipping"
                    );
                }
            }
        }

        Self { signatures }
    }

    /// JSON 파일에서 시그니처를 로드하고 컴파일합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let definitions = SignatureLoader::load_file(path).await?;
        Ok(Self::compile(definitions))
    }

    /// 로드된 시그니처 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// 시그니처가 하나도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// 우선순위 순서대로 시그니처를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledSignature> {
        self.signatures.iter()
    }

    /// ID로 시그니처를 조회합니다.
    pub fn get(&self, id: &str) -> Option<&CompiledSignature> {
        self.signatures.iter().find(|s| s.id() == id)
    }

    /// 로드된 시그니처 ID 목록을 반환합니다 (로그용).
    pub fn ids(&self) -> Vec<&str> {
        self.signatures.iter().map(|s| s.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definitions() -> Vec<ErrorSignature> {
        vec![
            ErrorSignature {
                id: "invalid_credentials".to_owned(),
                pattern: r"invalid credentials email=(?P<email>\S+) ip=(?P<ip>[0-9.]+)"
                    .to_owned(),
                notification_key: "email".to_owned(),
                resource_type: ResourceType::Email,
            },
            ErrorSignature {
                id: "resource_auth_failed".to_owned(),
                pattern: r"resource auth failed resource=(?P<resource>\S+) ip=(?P<ip>[0-9.]+)"
                    .to_owned(),
                notification_key: "resource".to_owned(),
                resource_type: ResourceType::Other,
            },
        ]
    }

    #[test]
    fn compile_builds_ordered_registry() {
        let registry = SignatureRegistry::compile(sample_definitions());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["invalid_credentials", "resource_auth_failed"]);
    }

    #[test]
    fn compile_skips_invalid_regex() {
        let mut definitions = sample_definitions();
        definitions.push(ErrorSignature {
            id: "broken".to_owned(),
            pattern: r"[unclosed".to_owned(),
            notification_key: "ip".to_owned(),
            resource_type: ResourceType::Other,
        });

        let registry = SignatureRegistry::compile(definitions);
        // 깨진 패턴만 빠지고 나머지는 로드됨
        assert_eq!(registry.len(), 2);
        assert!(registry.get("broken").is_none());
    }

    #[test]
    fn empty_registry_is_valid() {
        let registry = SignatureRegistry::empty();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn get_finds_signature_by_id() {
        let registry = SignatureRegistry::compile(sample_definitions());
        let compiled = registry.get("invalid_credentials").unwrap();
        assert_eq!(compiled.signature().notification_key, "email");
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn compiled_regex_requires_timestamp_prefix() {
        let registry = SignatureRegistry::compile(sample_definitions());
        let compiled = registry.get("invalid_credentials").unwrap();

        // 타임스탬프가 있는 라인은 매칭
        let with_ts = "2024-03-01T10:15:30.000Z [warn] invalid credentials email=a@b.c ip=10.0.0.1";
        assert!(compiled.regex().is_match(with_ts));

        // 타임스탬프가 없으면 매칭되지 않음
        let without_ts = "[warn] invalid credentials email=a@b.c ip=10.0.0.1";
        assert!(!compiled.regex().is_match(without_ts));
    }

    #[test]
    fn compiled_regex_captures_datetime_group() {
        let registry = SignatureRegistry::compile(sample_definitions());
        let compiled = registry.get("invalid_credentials").unwrap();

        let line = "2024-03-01T10:15:30.000Z invalid credentials email=a@b.c ip=10.0.0.1";
        let caps = compiled.regex().captures(line).unwrap();
        assert_eq!(caps.name("datetime").unwrap().as_str(), "2024-03-01T10:15:30.000Z");
        assert_eq!(caps.name("email").unwrap().as_str(), "a@b.c");
        assert_eq!(caps.name("ip").unwrap().as_str(), "10.0.0.1");
    }

    #[tokio::test]
    async fn load_missing_file_returns_error() {
        let result = SignatureRegistry::load("/nonexistent/signatures.json").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn load_compiles_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.json");
        std::fs::write(
            &path,
            r#"{
                "invalid_credentials": {
                    "pattern": "invalid credentials email=(?P<email>\\S+) ip=(?P<ip>[0-9.]+)",
                    "notification_key": "email",
                    "resource_type": "email"
                },
                "broken": {
                    "pattern": "[unclosed",
                    "notification_key": "ip"
                }
            }"#,
        )
        .unwrap();

        let registry = SignatureRegistry::load(&path).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("invalid_credentials").is_some());
    }
}
