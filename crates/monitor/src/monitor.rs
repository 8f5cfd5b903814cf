//! 모니터 루프 -- 테일링/디스패치/포맷팅/알림의 전체 흐름을 관리합니다.
//!
//! [`LogMonitor`]는 고정 주기의 단일 태스크 루프입니다. 한 사이클은
//! 파일 폴링 → 라인별 디스패치 → 포맷팅 → 알림 전송 순으로 진행되며,
//! 이전 사이클이 완전히 끝난 뒤에만 다음 사이클이 시작됩니다.
//!
//! # 에러 격리
//! 라인 하나, 시그니처 하나, 전송 한 번의 실패는 모두 해당 단위에서
//! 격리되어 루프를 멈추지 않습니다. 루프는 취소 전까지 종료되지 않습니다.
//!
//! # 내부 아키텍처
//! ```text
//! TailReader -> lines -> MatchDispatcher -> EventFormatter -> Notifier
//!                              |
//!                       SignatureRegistry (주기적 리로드, last-known-good 유지)
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use authtail_core::locale::Translations;
use authtail_core::metrics as metric_names;
use authtail_core::notifier::Notifier;

use crate::config::MonitorConfig;
use crate::dispatch::MatchDispatcher;
use crate::error::MonitorError;
use crate::format::EventFormatter;
use crate::signature::SignatureRegistry;
use crate::tail::TailReader;

/// 로그 모니터 -- 인증 실패 감시 루프
///
/// # 사용 예시
/// ```ignore
/// use authtail_monitor::{LogMonitorBuilder, SignatureRegistry};
///
/// let mut monitor = LogMonitorBuilder::new()
///     .config(config)
///     .registry(registry)
///     .translations(translations)
///     .notifier(notifier)
///     .build()?;
///
/// monitor.run(cancel_token).await;
/// ```
pub struct LogMonitor<N: Notifier> {
    /// 엔진 설정
    config: MonitorConfig,
    /// 파일 테일 리더 (오프셋 상태 소유)
    tail: TailReader,
    /// 활성 시그니처 스냅샷
    registry: SignatureRegistry,
    /// 이벤트 포매터
    formatter: EventFormatter,
    /// 알림 전송자
    notifier: N,
    /// 검사한 라인 수
    lines_scanned: u64,
    /// 매칭된 이벤트 수
    matches_found: u64,
    /// 전송 성공한 알림 수
    notifications_sent: u64,
    /// 전송 실패한 알림 수
    notify_failures: u64,
}

impl<N: Notifier> LogMonitor<N> {
    /// 검사한 라인 수를 반환합니다.
    pub fn lines_scanned(&self) -> u64 {
        self.lines_scanned
    }

    /// 매칭된 이벤트 수를 반환합니다.
    pub fn matches_found(&self) -> u64 {
        self.matches_found
    }

    /// 전송 성공한 알림 수를 반환합니다.
    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent
    }

    /// 전송 실패한 알림 수를 반환합니다.
    pub fn notify_failures(&self) -> u64 {
        self.notify_failures
    }

    /// 현재 테일 오프셋을 반환합니다.
    pub fn last_position(&self) -> u64 {
        self.tail.last_position()
    }

    /// 로드된 시그니처 수를 반환합니다.
    pub fn signature_count(&self) -> usize {
        self.registry.len()
    }

    /// 알림 전송자에 대한 불변 참조를 반환합니다.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// 테일 오프셋을 파일의 현재 끝으로 맞춥니다.
    ///
    /// 기존 내용(backlog)이 알림으로 재생되는 것을 막습니다.
    /// `run()`이 시작 시 호출하며, 사이클을 직접 구동하는 경우
    /// 먼저 호출해야 합니다.
    pub async fn initialize(&mut self) {
        self.tail.initialize().await;
    }

    /// 감시 루프를 실행합니다.
    ///
    /// 취소 토큰이 취소될 때까지 반환하지 않습니다.
    /// 시작 시 테일 오프셋을 파일 끝으로 맞추고 시작 알림을 한 번 보냅니다.
    pub async fn run(&mut self, cancel: CancellationToken) {
        self.initialize().await;

        metrics::gauge!(metric_names::MONITOR_SIGNATURES_LOADED).set(self.registry.len() as f64);
        tracing::info!(
            path = %self.config.log_path.display(),
            interval_secs = self.config.poll_interval_secs,
            signatures = ?self.registry.ids(),
            timezone = self.formatter.timezone().name(),
            version = self.config.version.as_str(),
            "starting log monitor"
        );

        let startup = self
            .formatter
            .startup_message(&self.config.version, chrono::Utc::now());
        if !self.notifier.send(&startup).await {
            tracing::warn!(
                notifier = self.notifier.name(),
                "failed to send startup notification"
            );
        }

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut last_reload = tokio::time::Instant::now();
        let reload_every = Duration::from_secs(self.config.reload_interval_secs);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("monitor loop cancelled");
                    return;
                }
                _ = interval.tick() => {
                    self.run_cycle().await;

                    if self.config.reload_interval_secs > 0
                        && last_reload.elapsed() >= reload_every
                    {
                        self.reload_signatures().await;
                        last_reload = tokio::time::Instant::now();
                    }
                }
            }
        }
    }

    /// 한 사이클을 실행합니다: 폴링 → 디스패치 → 포맷팅 → 전송.
    ///
    /// 실패는 라인 단위로 격리되며 이 메서드는 에러를 반환하지 않습니다.
    pub async fn run_cycle(&mut self) {
        let lines = self.tail.poll().await;

        for line in lines {
            self.lines_scanned += 1;
            metrics::counter!(metric_names::MONITOR_LINES_SCANNED_TOTAL).increment(1);

            let Some(event) = MatchDispatcher::dispatch(&line, &self.registry) else {
                continue;
            };

            self.matches_found += 1;
            metrics::counter!(
                metric_names::MONITOR_MATCHES_TOTAL,
                metric_names::LABEL_SIGNATURE => event.signature_id.clone()
            )
            .increment(1);

            // 디스패처가 반환한 ID는 항상 현재 레지스트리에 존재
            let Some(meta) = self
                .registry
                .get(&event.signature_id)
                .map(|compiled| compiled.signature().clone())
            else {
                continue;
            };

            match self.formatter.format(&event, &meta) {
                Ok(payload) => {
                    tracing::info!(
                        signature_id = %event.signature_id,
                        reason = %payload.reason,
                        resource = %payload.resource_value,
                        ip = %payload.source_ip,
                        at = %payload.local_time,
                        "authentication failure detected"
                    );

                    if self.notifier.send(&payload.text).await {
                        self.notifications_sent += 1;
                        metrics::counter!(metric_names::NOTIFY_SENT_TOTAL).increment(1);
                        tracing::info!(
                            signature_id = %event.signature_id,
                            resource = %payload.resource_value,
                            ip = %payload.source_ip,
                            "notification sent"
                        );
                    } else {
                        self.notify_failures += 1;
                        metrics::counter!(metric_names::NOTIFY_FAILED_TOTAL).increment(1);
                        tracing::error!(
                            signature_id = %event.signature_id,
                            resource = %payload.resource_value,
                            ip = %payload.source_ip,
                            "failed to send notification, event not retried"
                        );
                    }
                }
                Err(e) => {
                    metrics::counter!(metric_names::MONITOR_FORMAT_ERRORS_TOTAL).increment(1);
                    tracing::error!(
                        signature_id = %event.signature_id,
                        line = %event.raw_line,
                        error = %e,
                        "failed to format event, dropping"
                    );
                }
            }
        }
    }

    /// 시그니처 레지스트리를 디스크에서 다시 로드합니다.
    ///
    /// 새 스냅샷이 비어 있거나 로드에 실패하면 기존 스냅샷을 유지합니다
    /// (last-known-good). 교체가 일어난 경우에만 `true`를 반환합니다.
    pub async fn reload_signatures(&mut self) -> bool {
        match SignatureRegistry::load(&self.config.signatures_path).await {
            Ok(new_registry) if !new_registry.is_empty() => {
                tracing::info!(
                    count = new_registry.len(),
                    signatures = ?new_registry.ids(),
                    "signatures reloaded"
                );
                metrics::gauge!(metric_names::MONITOR_SIGNATURES_LOADED)
                    .set(new_registry.len() as f64);
                self.registry = new_registry;
                true
            }
            Ok(_) => {
                tracing::warn!(
                    path = %self.config.signatures_path.display(),
                    "signature reload yielded no valid signatures, keeping previous registry"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    path = %self.config.signatures_path.display(),
                    error = %e,
                    "failed to reload signatures, keeping previous registry"
                );
                false
            }
        }
    }
}

/// 로그 모니터 빌더
///
/// 모니터를 구성하고 설정을 검증합니다.
pub struct LogMonitorBuilder<N: Notifier> {
    config: MonitorConfig,
    registry: SignatureRegistry,
    translations: Option<Translations>,
    notifier: Option<N>,
}

impl<N: Notifier> LogMonitorBuilder<N> {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
            registry: SignatureRegistry::empty(),
            translations: None,
            notifier: None,
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// 초기 시그니처 레지스트리를 지정합니다.
    ///
    /// 지정하지 않으면 빈 레지스트리로 시작하며, 리로드 주기에 따라
    /// 디스크에서 채워질 수 있습니다.
    pub fn registry(mut self, registry: SignatureRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 번역 테이블을 지정합니다.
    ///
    /// 지정하지 않으면 내장 기본 테이블을 사용합니다.
    pub fn translations(mut self, translations: Translations) -> Self {
        self.translations = Some(translations);
        self
    }

    /// 알림 전송자를 지정합니다 (필수).
    pub fn notifier(mut self, notifier: N) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 모니터를 빌드합니다.
    pub fn build(self) -> Result<LogMonitor<N>, MonitorError> {
        self.config.validate()?;

        let notifier = self.notifier.ok_or_else(|| MonitorError::Config {
            field: "notifier".to_owned(),
            reason: "a notifier is required".to_owned(),
        })?;

        let translations = match self.translations {
            Some(translations) => translations,
            None => Translations::embedded_default().map_err(|e| MonitorError::Config {
                field: "translations".to_owned(),
                reason: e.to_string(),
            })?,
        };

        let formatter = EventFormatter::new(translations, self.config.timezone);
        let tail = TailReader::new(self.config.log_path.clone());

        Ok(LogMonitor {
            config: self.config,
            tail,
            registry: self.registry,
            formatter,
            notifier,
            lines_scanned: 0,
            matches_found: 0,
            notifications_sent: 0,
            notify_failures: 0,
        })
    }
}

impl<N: Notifier> Default for LogMonitorBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
