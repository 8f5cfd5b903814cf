//! 번역 테이블 — 알림 UI 문자열 로딩 및 폴백 체인
//!
//! [`Translations`]는 알림 메시지에 쓰이는 UI 문자열(`tg_*` 키)과
//! 시그니처 ID별 사유 번역(`error_translations`)을 담습니다.
//!
//! # 폴백 체인
//! 1. 요청된 언어 파일 (`{locale_dir}/{lang}.json`)
//! 2. 기본 언어 파일 (`{locale_dir}/es.json`)
//! 3. 크레이트에 내장된 기본 테이블
//!
//! 내장 테이블 파싱까지 실패한 경우에만 에러를 반환하며,
//! 이는 복구 불가능한 상황으로 프로세스 시작을 중단해야 합니다.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LocaleError;

/// 기본 언어 (요청된 언어 파일이 없을 때 사용)
pub const DEFAULT_LANGUAGE: &str = "es";

/// 내장 기본 테이블 (repo의 config/locale/es.json과 동일 파일)
const EMBEDDED_DEFAULT: &str = include_str!("../../../config/locale/es.json");

/// 로케일 파일의 직렬화 형태
///
/// 최상위는 평탄한 문자열 맵이며, `error_translations` 키만 중첩 맵입니다.
#[derive(Debug, Deserialize)]
struct LocaleFile {
    /// 시그니처 ID -> 번역된 사유
    #[serde(default)]
    error_translations: HashMap<String, String>,
    /// 나머지 UI 문자열 키
    #[serde(flatten)]
    strings: HashMap<String, String>,
}

/// 번역 테이블
///
/// 한 번 로드되면 불변이며, 포매터와 모니터 루프에 값으로 전달됩니다.
#[derive(Debug, Clone)]
pub struct Translations {
    /// UI 문자열 (`tg_intento` 등)
    strings: HashMap<String, String>,
    /// 시그니처 ID별 사유 번역
    error_translations: HashMap<String, String>,
    /// 실제로 로드된 언어
    language: String,
}

impl Translations {
    /// JSON 문자열에서 번역 테이블을 파싱합니다.
    pub fn parse(json: &str, language: &str, source: &str) -> Result<Self, LocaleError> {
        let file: LocaleFile =
            serde_json::from_str(json).map_err(|e| LocaleError::ParseFailed {
                path: source.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            strings: file.strings,
            error_translations: file.error_translations,
            language: language.to_owned(),
        })
    }

    /// 크레이트에 내장된 기본 테이블을 반환합니다.
    pub fn embedded_default() -> Result<Self, LocaleError> {
        Self::parse(EMBEDDED_DEFAULT, DEFAULT_LANGUAGE, "(embedded)")
    }

    /// 로케일 디렉토리에서 요청된 언어의 테이블을 로드합니다.
    ///
    /// 요청된 언어 → 기본 언어 파일 → 내장 테이블 순으로 폴백합니다.
    /// 내장 테이블까지 읽을 수 없는 경우에만 `Err`를 반환합니다.
    pub async fn load(locale_dir: impl AsRef<Path>, language: &str) -> Result<Self, LocaleError> {
        let locale_dir = locale_dir.as_ref();
        let lang = language.to_lowercase();

        match Self::load_file(locale_dir, &lang).await {
            Ok(table) => return Ok(table),
            Err(e) => {
                tracing::warn!(
                    language = lang.as_str(),
                    error = %e,
                    "locale file unavailable, falling back to default language"
                );
            }
        }

        if lang != DEFAULT_LANGUAGE {
            match Self::load_file(locale_dir, DEFAULT_LANGUAGE).await {
                Ok(table) => return Ok(table),
                Err(e) => {
                    tracing::warn!(
                        language = DEFAULT_LANGUAGE,
                        error = %e,
                        "default locale file unavailable, falling back to embedded table"
                    );
                }
            }
        }

        Self::embedded_default()
    }

    /// 단일 로케일 파일을 로드합니다.
    async fn load_file(locale_dir: &Path, lang: &str) -> Result<Self, LocaleError> {
        let path = locale_dir.join(format!("{lang}.json"));
        let content =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| LocaleError::FileUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
        let table = Self::parse(&content, lang, &path.display().to_string())?;
        tracing::info!(language = lang, path = %path.display(), "loaded translations");
        Ok(table)
    }

    /// 실제로 로드된 언어를 반환합니다.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// UI 문자열을 조회합니다.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// UI 문자열을 조회하고, 없으면 키 자체를 반환합니다.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }

    /// 시그니처 사유 번역을 조회하고, 없으면 시그니처 ID를 그대로 반환합니다.
    pub fn error_reason<'a>(&'a self, signature_id: &'a str) -> &'a str {
        self.error_translations
            .get(signature_id)
            .map(String::as_str)
            .unwrap_or(signature_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "tg_intento": "Intento de acceso fallido detectado",
        "tg_ip": "IP de origen",
        "error_translations": {
            "invalid_credentials": "Credenciales inválidas"
        }
    }"#;

    #[test]
    fn parse_sample_table() {
        let table = Translations::parse(SAMPLE, "es", "test.json").unwrap();
        assert_eq!(table.language(), "es");
        assert_eq!(table.lookup("tg_ip"), Some("IP de origen"));
        assert_eq!(table.lookup("tg_missing"), None);
    }

    #[test]
    fn text_falls_back_to_key() {
        let table = Translations::parse(SAMPLE, "es", "test.json").unwrap();
        assert_eq!(table.text("tg_intento"), "Intento de acceso fallido detectado");
        assert_eq!(table.text("tg_unknown_key"), "tg_unknown_key");
    }

    #[test]
    fn error_reason_falls_back_to_signature_id() {
        let table = Translations::parse(SAMPLE, "es", "test.json").unwrap();
        assert_eq!(
            table.error_reason("invalid_credentials"),
            "Credenciales inválidas"
        );
        assert_eq!(table.error_reason("unmapped_signature"), "unmapped_signature");
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let result = Translations::parse("{not json", "es", "bad.json");
        assert!(matches!(result, Err(LocaleError::ParseFailed { .. })));
    }

    #[test]
    fn embedded_default_parses() {
        let table = Translations::embedded_default().unwrap();
        assert_eq!(table.language(), DEFAULT_LANGUAGE);
        assert!(table.lookup("tg_intento").is_some());
        assert!(table.lookup("tg_zona_horaria").is_some());
    }

    #[tokio::test]
    async fn load_prefers_requested_language() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("en.json"),
            r#"{"tg_intento": "Failed login attempt detected"}"#,
        )
        .unwrap();

        let table = Translations::load(dir.path(), "EN").await.unwrap();
        assert_eq!(table.language(), "en");
        assert_eq!(
            table.text("tg_intento"),
            "Failed login attempt detected"
        );
    }

    #[tokio::test]
    async fn load_falls_back_to_default_language_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("es.json"),
            r#"{"tg_intento": "Intento de acceso fallido detectado"}"#,
        )
        .unwrap();

        // "DE" 파일이 없으므로 es.json으로 폴백
        let table = Translations::load(dir.path(), "DE").await.unwrap();
        assert_eq!(table.language(), "es");
    }

    #[tokio::test]
    async fn load_falls_back_to_embedded_table() {
        let dir = tempfile::tempdir().unwrap();
        // 디렉토리가 비어 있으므로 내장 테이블로 폴백
        let table = Translations::load(dir.path(), "ES").await.unwrap();
        assert_eq!(table.language(), DEFAULT_LANGUAGE);
        assert!(table.lookup("tg_motivo").is_some());
    }
}
