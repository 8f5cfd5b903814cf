//! 시그니처 파일 로더 -- JSON 시그니처 문서를 디스크에서 로드합니다.
//!
//! 문서는 시그니처 ID를 키로 하는 JSON 객체이며, 문서 내 키 순서가
//! 매칭 우선순위가 됩니다. 개별 항목의 역직렬화/검증 실패는 경고
//! 로그를 남기고 건너뜁니다.

use std::path::Path;

use crate::error::MonitorError;

use super::types::ErrorSignature;

/// 시그니처 파일 로더 설정
const MAX_SIGNATURE_FILE_SIZE: u64 = 1024 * 1024; // 1MB
const MAX_SIGNATURES_COUNT: usize = 1_000;

/// 시그니처 파일 로더
pub struct SignatureLoader;

impl SignatureLoader {
    /// 단일 JSON 파일에서 시그니처 정의를 로드합니다.
    ///
    /// # Errors
    /// - 파일을 읽을 수 없는 경우
    /// - 문서 전체가 JSON 객체로 파싱되지 않는 경우
    /// - 시그니처 수가 `MAX_SIGNATURES_COUNT`를 초과하는 경우
    pub async fn load_file(path: impl AsRef<Path>) -> Result<Vec<ErrorSignature>, MonitorError> {
        let path = path.as_ref();

        // 파일 크기 검증
        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|e| MonitorError::SignatureLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file metadata: {e}"),
                })?;

        if metadata.len() > MAX_SIGNATURE_FILE_SIZE {
            return Err(MonitorError::SignatureLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_SIGNATURE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| MonitorError::SignatureLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        Self::parse_json(&content, &path.display().to_string())
    }

    /// JSON 문자열을 파싱하여 시그니처 목록을 생성합니다.
    ///
    /// 반환 순서는 문서 내 키 순서와 동일하며, 이 순서가
    /// first-match-wins 매칭 우선순위가 됩니다.
    pub fn parse_json(
        json_str: &str,
        source: &str,
    ) -> Result<Vec<ErrorSignature>, MonitorError> {
        let doc: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json_str)
            .map_err(|e| MonitorError::SignatureLoad {
                path: source.to_owned(),
                reason: format!("JSON parse error: {e}"),
            })?;

        let mut signatures = Vec::new();

        for (id, value) in doc {
            match serde_json::from_value::<ErrorSignature>(value) {
                Ok(mut signature) => {
                    signature.id = id;

                    if let Err(e) = signature.validate() {
                        tracing::warn!(
                            signature_id = %signature.id,
                            source,
                            error = %e,
                            "invalid signature definition, skipping"
                        );
                        continue;
                    }
                    signatures.push(signature);
                }
                Err(e) => {
                    tracing::warn!(
                        signature_id = %id,
                        source,
                        error = %e,
                        "malformed signature definition, skipping"
                    );
                }
            }

            if signatures.len() > MAX_SIGNATURES_COUNT {
                return Err(MonitorError::SignatureLoad {
                    path: source.to_owned(),
                    reason: format!("too many signatures: max {MAX_SIGNATURES_COUNT}"),
                });
            }
        }

        tracing::info!(source, count = signatures.len(), "loaded signature definitions");

        Ok(signatures)
    }
}
