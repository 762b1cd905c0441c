use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ファイル名が接尾辞で終わるか（大文字小文字は区別しない）
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    let suffix = suffix.to_lowercase();
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(&suffix))
        .unwrap_or(false)
}

/// フォルダ直下にある処理対象のスクリーンショットを列挙
pub fn scan_folder(folder: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(AppError::FolderNotFound(folder.display().to_string()));
    }

    let mut screenshots: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| has_suffix(path, suffix))
        .collect();

    // ファイル名（撮影時刻）でソート
    screenshots.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(screenshots)
}
