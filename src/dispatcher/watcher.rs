//! OSのファイル監視（notify）から `FileEvent` への橋渡し

use super::FileEvent;
use crate::error::{AppError, Result};
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
#[cfg(not(target_os = "linux"))]
use notify::event::CreateKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use tokio::sync::mpsc;

/// 書き込みが完了したことを示すイベントか
///
/// Linux（inotify）では書き込みクローズと、フォルダへのリネーム移動だけを見る。
/// 作成・データ変更は書き込み途中にも届くため使わない。
#[cfg(target_os = "linux")]
pub fn is_write_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    )
}

/// 書き込みが完了したことを示すイベントか
///
/// クローズ通知のない環境では作成・データ変更で代用し、
/// 書き込み途中の通知は待ち時間（settle）でまとめる。
#[cfg(not(target_os = "linux"))]
pub fn is_write_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
            | EventKind::Create(CreateKind::File | CreateKind::Any)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
    )
}

/// フォルダ（直下のみ）の監視を開始する
///
/// 返した `RecommendedWatcher` を破棄すると監視が止まり、送信側も閉じる。
/// 監視の開始に失敗した場合はプロセス全体を止めるべきエラーとして返す。
pub fn watch_folder(folder: &Path, events: mpsc::Sender<FileEvent>) -> Result<RecommendedWatcher> {
    if !folder.is_dir() {
        return Err(AppError::FolderNotFound(folder.display().to_string()));
    }

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !is_write_event(&event.kind) {
                return;
            }
            for path in event.paths {
                if events.blocking_send(FileEvent { path }).is_err() {
                    // 受信側が停止済み
                    return;
                }
            }
        }
        Err(e) => tracing::error!(error = %e, "error watching file system"),
    })
    .map_err(|e| AppError::Watch(e.to_string()))?;

    watcher
        .watch(folder, RecursiveMode::NonRecursive)
        .map_err(|e| AppError::Watch(format!("{}: {}", folder.display(), e)))?;

    tracing::info!(folder = %folder.display(), "watching for file system changes");
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};

    #[test]
    fn test_write_completion_qualifies() {
        assert!(is_write_event(&EventKind::Access(AccessKind::Close(AccessMode::Write))));
        assert!(is_write_event(&EventKind::Modify(ModifyKind::Name(RenameMode::To))));
    }

    #[test]
    fn test_other_events_are_ignored() {
        assert!(!is_write_event(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_write_event(&EventKind::Access(AccessKind::Close(AccessMode::Read))));
        assert!(!is_write_event(&EventKind::Create(CreateKind::Folder)));
        assert!(!is_write_event(&EventKind::Modify(ModifyKind::Name(RenameMode::From))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_in_progress_writes_are_ignored_on_linux() {
        assert!(!is_write_event(&EventKind::Create(CreateKind::File)));
        assert!(!is_write_event(&EventKind::Create(CreateKind::Any)));
        assert!(!is_write_event(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
        assert!(!is_write_event(&EventKind::Modify(ModifyKind::Any)));
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn test_create_and_data_events_qualify_without_close_events() {
        assert!(is_write_event(&EventKind::Create(CreateKind::File)));
        assert!(is_write_event(&EventKind::Modify(ModifyKind::Data(DataChange::Content))));
    }

    #[test]
    fn test_watch_missing_folder_fails() {
        let (tx, _rx) = mpsc::channel(1);
        let result = watch_folder(Path::new("/nonexistent/auction-ocr/12345"), tx);
        assert!(matches!(result, Err(AppError::FolderNotFound(_))));
    }
}
