//! 메트릭 상수 정의
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 익스포터는 장착하지 않으며, 레코더 연결은
//! 운영 환경의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `authtail_`
//! - 모듈명: `monitor_`, `notify_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(authtail_core::metrics::MONITOR_LINES_SCANNED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 시그니처 ID 레이블 키
pub const LABEL_SIGNATURE: &str = "signature";

// ─── Monitor 메트릭 ────────────────────────────────────────────────

/// Monitor: 검사한 로그 라인 수 (counter)
pub const MONITOR_LINES_SCANNED_TOTAL: &str = "authtail_monitor_lines_scanned_total";

/// Monitor: 시그니처 매칭 수 (counter, label: signature)
pub const MONITOR_MATCHES_TOTAL: &str = "authtail_monitor_matches_total";

/// Monitor: 감지된 파일 로테이션 수 (counter)
pub const MONITOR_ROTATIONS_TOTAL: &str = "authtail_monitor_rotations_total";

/// Monitor: 파일 읽기 실패 수 (counter)
pub const MONITOR_READ_ERRORS_TOTAL: &str = "authtail_monitor_read_errors_total";

/// Monitor: 이벤트 포맷팅 실패 수 (counter)
pub const MONITOR_FORMAT_ERRORS_TOTAL: &str = "authtail_monitor_format_errors_total";

/// Monitor: 현재 로드된 시그니처 수 (gauge)
pub const MONITOR_SIGNATURES_LOADED: &str = "authtail_monitor_signatures_loaded";

// ─── Notify 메트릭 ─────────────────────────────────────────────────

/// Notify: 전송 성공한 알림 수 (counter)
pub const NOTIFY_SENT_TOTAL: &str = "authtail_notify_sent_total";

/// Notify: 전송 실패한 알림 수 (counter)
pub const NOTIFY_FAILED_TOTAL: &str = "authtail_notify_failed_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 이 함수는 레코더 설치 후 한 번만 호출해야 합니다.
/// 레코더가 없는 환경에서는 no-op입니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        MONITOR_LINES_SCANNED_TOTAL,
        "Total number of log lines scanned"
    );
    describe_counter!(
        MONITOR_MATCHES_TOTAL,
        "Total number of signature matches, per signature"
    );
    describe_counter!(
        MONITOR_ROTATIONS_TOTAL,
        "Total number of log file rotations detected"
    );
    describe_counter!(
        MONITOR_READ_ERRORS_TOTAL,
        "Total number of failed log file reads"
    );
    describe_counter!(
        MONITOR_FORMAT_ERRORS_TOTAL,
        "Total number of matched events dropped during formatting"
    );
    describe_gauge!(
        MONITOR_SIGNATURES_LOADED,
        "Number of compiled signatures in the active registry"
    );
    describe_counter!(NOTIFY_SENT_TOTAL, "Total number of notifications delivered");
    describe_counter!(
        NOTIFY_FAILED_TOTAL,
        "Total number of notification delivery failures"
    );
}
