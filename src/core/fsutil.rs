// Small filesystem helpers shared by the installers and the orchestrator.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::core::error::{LauncherError, LauncherResult};

pub async fn create_dir_all(path: &Path) -> LauncherResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| LauncherError::io(path, e))
}

async fn create_parent(path: &Path) -> LauncherResult<()> {
    match path.parent() {
        Some(parent) => create_dir_all(parent).await,
        None => Ok(()),
    }
}

/// Removes a directory tree; a missing directory is fine.
pub async fn remove_dir_if_exists(path: &Path) -> LauncherResult<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LauncherError::io(path, e)),
    }
}

pub async fn remove_file_if_exists(path: &Path) -> LauncherResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LauncherError::io(path, e)),
    }
}

/// Copies `from` to `to`, creating parents and overwriting any existing file.
pub async fn copy_file(from: &Path, to: &Path) -> LauncherResult<()> {
    create_parent(to).await?;
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| LauncherError::io(from, e))?;
    Ok(())
}

/// Moves `from` to `to`, overwriting. Falls back to copy + delete when a
/// rename is not possible (different filesystems).
pub async fn move_file(from: &Path, to: &Path) -> LauncherResult<()> {
    create_parent(to).await?;
    remove_file_if_exists(to).await?;
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    copy_file(from, to).await?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|e| LauncherError::io(from, e))
}

pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Every regular file below `root`, as absolute paths. A missing root yields
/// an empty list.
pub async fn files_recursive(root: &Path) -> LauncherResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                LauncherError::io(path, e.into())
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| LauncherError::Other(format!("directory walk panicked: {e}")))?
}
