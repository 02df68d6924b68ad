use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tracing::debug;

use super::error::BackupError;

/// Sortable timestamp embedded in backup and output file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Byte-exact copy of the master document taken before any mutation
///
/// Named `{stem}_backup_{timestamp}{ext}` inside `backup_dir`.
pub async fn snapshot(master: &Path, backup_dir: &Path) -> Result<PathBuf, BackupError> {
    copy_with_suffix(master, backup_dir, "backup").await
}

/// Copy of the merged master document handed to the user
///
/// Named `{stem}_updated_{timestamp}{ext}` inside `output_dir`.
pub async fn save_output_copy(master: &Path, output_dir: &Path) -> Result<PathBuf, BackupError> {
    copy_with_suffix(master, output_dir, "updated").await
}

async fn copy_with_suffix(
    source: &Path,
    target_dir: &Path,
    label: &str,
) -> Result<PathBuf, BackupError> {
    fs::create_dir_all(target_dir)
        .await
        .map_err(|source| BackupError::CreateDir {
            path: target_dir.to_path_buf(),
            source,
        })?;

    let target = unique_target(source, target_dir, label).await?;
    fs::copy(source, &target)
        .await
        .map_err(|e| BackupError::Copy {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;

    debug!(from = %source.display(), to = %target.display(), "Copied workbook");
    Ok(target)
}

/// Timestamped name that does not exist yet; a counter is appended on collision
async fn unique_target(source: &Path, target_dir: &Path, label: &str) -> Result<PathBuf, BackupError> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| BackupError::InvalidFileName(source.to_path_buf()))?;
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);

    let base = format!("{}_{}_{}", stem, label, timestamp);
    let mut candidate = target_dir.join(format!("{}{}", base, extension));
    let mut counter = 1;
    while fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = target_dir.join(format!("{}_{}{}", base, counter, extension));
        counter += 1;
    }
    Ok(candidate)
}
