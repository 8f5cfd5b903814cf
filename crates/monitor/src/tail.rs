//! 파일 테일 리더 -- 추가된 바이트만 증분 읽기
//!
//! [`TailReader`]는 하나의 로그 파일에 대한 바이트 오프셋을 소유하며,
//! `tail -f`와 유사한 동작을 폴링 방식으로 구현합니다.
//!
//! # 오프셋 규칙
//! - 시작 시 오프셋은 파일의 현재 크기로 설정됩니다 (기존 내용은 절대 재생하지 않음)
//! - 파일 크기가 오프셋보다 작아지면 로테이션으로 간주하고 0으로 리셋합니다
//! - 읽기 실패 시 오프셋을 전진시키지 않아 같은 바이트를 다음 사이클에 재시도합니다

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use authtail_core::metrics as metric_names;

use crate::error::MonitorError;

/// 파일 테일 리더
///
/// 지정된 파일을 폴링하여 마지막으로 읽은 위치 이후에 추가된
/// 라인만 반환합니다. 파일 로테이션(크기 축소)을 자동 감지합니다.
#[derive(Debug)]
pub struct TailReader {
    /// 감시 대상 파일 경로 (심볼릭 링크 가능)
    path: PathBuf,
    /// 마지막으로 소비한 바이트 오프셋
    last_position: u64,
}

impl TailReader {
    /// 새 테일 리더를 생성합니다. 오프셋은 0에서 시작합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_position: 0,
        }
    }

    /// 감시 대상 파일 경로를 반환합니다.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 오프셋을 반환합니다.
    pub fn last_position(&self) -> u64 {
        self.last_position
    }

    /// 오프셋을 파일의 현재 끝으로 설정합니다.
    ///
    /// 모니터 시작 시 한 번 호출되어 기존 내용(backlog)이 알림으로
    /// 재생되는 것을 막습니다. 파일이 없으면 오프셋 0으로 대기하며,
    /// 파일 존재 여부는 매 사이클 다시 확인됩니다.
    pub async fn initialize(&mut self) {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => {
                self.last_position = meta.len();
                tracing::info!(
                    path = %self.path.display(),
                    position = self.last_position,
                    "tail initialized at end of existing file"
                );
            }
            Err(_) => {
                self.last_position = 0;
                tracing::info!(
                    path = %self.path.display(),
                    "log file absent at startup, waiting for creation"
                );
            }
        }
    }

    /// 마지막 읽기 이후 추가된 라인을 반환합니다.
    ///
    /// 반환되는 라인은 앞뒤 공백이 제거되고 빈 라인이 걸러진 상태입니다.
    /// 모든 실패는 내부에서 로그로 남기고 빈 목록으로 처리되며,
    /// 읽기 실패 시 오프셋은 전진하지 않습니다.
    pub async fn poll(&mut self) -> Vec<String> {
        let current_size = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.path.display(),
                    "log file not found, will retry next cycle"
                );
                return Vec::new();
            }
            Err(e) => {
                metrics::counter!(metric_names::MONITOR_READ_ERRORS_TOTAL).increment(1);
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to stat log file"
                );
                return Vec::new();
            }
        };

        // 파일이 오프셋보다 작아졌으면 로테이션된 것
        if current_size < self.last_position {
            metrics::counter!(metric_names::MONITOR_ROTATIONS_TOTAL).increment(1);
            tracing::info!(
                path = %self.path.display(),
                previous = self.last_position,
                current = current_size,
                "log file rotated, resetting position"
            );
            self.last_position = 0;
        }

        // 새 내용 없음
        if current_size <= self.last_position {
            return Vec::new();
        }

        match self.read_span(current_size).await {
            Ok(content) => {
                self.last_position = current_size;
                content
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            }
            Err(e) => {
                metrics::counter!(metric_names::MONITOR_READ_ERRORS_TOTAL).increment(1);
                tracing::error!(
                    path = %self.path.display(),
                    position = self.last_position,
                    error = %e,
                    "failed to read log file, offset not advanced"
                );
                Vec::new()
            }
        }
    }

    /// 현재 오프셋부터 `until` 경계까지 읽어 UTF-8 문자열로 반환합니다.
    ///
    /// 읽기 범위를 폴링 시점에 관측한 크기로 제한하므로, 읽는 도중의
    /// 동시 추가가 중복 읽기를 일으키지 않습니다.
    async fn read_span(&self, until: u64) -> Result<String, MonitorError> {
        let tail_read = |e: std::io::Error| MonitorError::TailRead {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };

        let mut file = tokio::fs::File::open(&self.path).await.map_err(tail_read)?;
        file.seek(SeekFrom::Start(self.last_position))
            .await
            .map_err(tail_read)?;

        let span_len = until - self.last_position;
        let mut buf = Vec::with_capacity(span_len as usize);
        file.take(span_len)
            .read_to_end(&mut buf)
            .await
            .map_err(tail_read)?;

        String::from_utf8(buf).map_err(|e| MonitorError::TailRead {
            path: self.path.display().to_string(),
            reason: format!("appended bytes are not valid utf-8: {e}"),
        })
    }
}
