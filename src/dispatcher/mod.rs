//! ファイル監視イベントのディスパッチ
//!
//! 書き込み完了イベントを受け取り、対象ファイルごとに1回パイプラインを実行する。
//!
//! - 同じパスが待機中・実行中なら後続のイベントは捨てる
//! - 同時実行数はセマフォで制限し、空きがなければイベントの受信を止める
//!   （キューが詰まると監視スレッド側で送信が待たされる）
//! - 停止時は新しいイベントを受け付けず、実行中のタスクの完了を待つ

mod watcher;

pub use watcher::{is_write_event, watch_folder};

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::scanner;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// 書き込みが完了した（可能性のある）ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub image_suffix: String,
    pub keep_files: bool,
    pub max_concurrent_runs: usize,
    pub settle: Duration,
}

impl From<&Config> for DispatchOptions {
    fn from(config: &Config) -> Self {
        Self {
            image_suffix: config.image_suffix.clone(),
            keep_files: config.keep_screenshots,
            max_concurrent_runs: config.dispatcher.max_concurrent_runs.max(1),
            settle: Duration::from_millis(config.dispatcher.settle_millis),
        }
    }
}

/// `Dispatcher::run` の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 接尾辞が一致せず無視したイベント
    pub ignored: usize,
    /// 同じパスが待機中・実行中だったため捨てたイベント
    pub deduplicated: usize,
}

type InFlight = Arc<Mutex<HashSet<PathBuf>>>;

/// タスク終了時（パニック時も含む）にパスを実行中集合から外す
struct InFlightGuard {
    in_flight: InFlight,
    path: PathBuf,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.path);
        }
    }
}

pub struct Dispatcher {
    pipeline: Pipeline,
    options: DispatchOptions,
    in_flight: InFlight,
}

impl Dispatcher {
    pub fn new(pipeline: Pipeline, options: DispatchOptions) -> Self {
        Self {
            pipeline,
            options,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// ファイル名が画像の接尾辞で終わるか（大文字小文字は区別しない）
    pub fn qualifies(&self, path: &Path) -> bool {
        scanner::has_suffix(path, &self.options.image_suffix)
    }

    /// イベントを受け取り続ける。チャネルが閉じるか `shutdown` が呼ばれたら
    /// 実行中のタスクを待ってから集計を返す
    pub async fn run(
        self,
        mut events: mpsc::Receiver<FileEvent>,
        shutdown: CancellationToken,
    ) -> DispatchSummary {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_runs));
        let mut tasks: JoinSet<bool> = JoinSet::new();
        let mut summary = DispatchSummary::default();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested; no longer accepting file events");
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    record_outcome(&mut summary, joined);
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::debug!("file event channel closed");
                        break;
                    };

                    if !self.qualifies(&event.path) {
                        tracing::trace!(file = %event.path.display(), "ignoring non-image file");
                        summary.ignored += 1;
                        continue;
                    }

                    let Some(guard) = self.claim(&event.path) else {
                        tracing::trace!(file = %event.path.display(), "already pending; dropping event");
                        summary.deduplicated += 1;
                        continue;
                    };

                    let permit = tokio::select! {
                        permit = semaphore.clone().acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                        _ = shutdown.cancelled() => {
                            tracing::info!("shutdown requested; no longer accepting file events");
                            break;
                        }
                    };

                    tracing::debug!(file = %event.path.display(), "file added");
                    summary.dispatched += 1;
                    tasks.spawn(self.run_one(event.path, guard, permit));
                }
            }
        }

        if !tasks.is_empty() {
            tracing::info!(in_flight = tasks.len(), "waiting for in-flight runs");
        }
        while let Some(joined) = tasks.join_next().await {
            record_outcome(&mut summary, joined);
        }

        summary
    }

    fn claim(&self, path: &Path) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(path.to_path_buf()) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: self.in_flight.clone(),
            path: path.to_path_buf(),
        })
    }

    fn run_one(
        &self,
        path: PathBuf,
        guard: InFlightGuard,
        permit: OwnedSemaphorePermit,
    ) -> impl std::future::Future<Output = bool> + Send + 'static {
        let pipeline = self.pipeline.clone();
        let keep_files = self.options.keep_files;
        let settle = self.options.settle;
        let span = tracing::info_span!("screenshot", file = %path.display());

        async move {
            let _guard = guard;
            let _permit = permit;

            if !settle.is_zero() {
                tokio::time::sleep(settle).await;
            }

            tracing::debug!("trying to parse screenshot");
            let succeeded = match pipeline.process_file(&path).await {
                Ok(report) => {
                    tracing::info!(
                        records = report.records.len(),
                        emitted = report.emitted,
                        emission_failures = report.emission_failures,
                        "screenshot processed"
                    );
                    true
                }
                Err(e) => {
                    tracing::error!(stage = %e.stage(), error = %e, "error parsing screenshot");
                    false
                }
            };

            if !keep_files {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(error = %e, "error removing screenshot");
                    }
                }
            }

            succeeded
        }
        .instrument(span)
    }
}

fn record_outcome(summary: &mut DispatchSummary, joined: Result<bool, tokio::task::JoinError>) {
    match joined {
        Ok(true) => summary.succeeded += 1,
        Ok(false) => summary.failed += 1,
        Err(e) => {
            tracing::error!(error = %e, "pipeline task aborted");
            summary.failed += 1;
        }
    }
}
