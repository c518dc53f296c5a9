use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{normalize_selector, ArchiveTool};
use crate::core::error::{LauncherError, LauncherResult};

/// Drives an external `7z` binary. Each call waits for the process to exit;
/// a non-zero exit becomes an archive error carrying 7-Zip's own output.
pub struct SevenZip {
    bin: PathBuf,
}

impl SevenZip {
    pub fn new(bin: PathBuf) -> Self {
        Self { bin }
    }

    async fn run(&self, archive: &Path, args: Vec<String>) -> LauncherResult<()> {
        debug!("Running {:?} {}", self.bin, args.join(" "));

        let output = Command::new(&self.bin)
            .args(&args)
            .output()
            .await
            .map_err(|e| LauncherError::Archive {
                archive: archive.to_path_buf(),
                detail: format!("failed to spawn {}: {}", self.bin.display(), e),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(LauncherError::Archive {
            archive: archive.to_path_buf(),
            detail: format!("7z exited with {:?}: {}", output.status.code(), detail),
        })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[async_trait]
impl ArchiveTool for SevenZip {
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        selector: Option<&str>,
    ) -> LauncherResult<()> {
        let mut args = vec![
            "x".to_string(),
            path_arg(archive),
            format!("-o{}", path_arg(dest)),
            "-y".to_string(),
        ];
        if let Some(sel) = selector {
            args.push("-r".to_string());
            args.push(normalize_selector(sel));
        }
        self.run(archive, args).await
    }

    async fn delete(&self, archive: &Path, entry: &str) -> LauncherResult<()> {
        let args = vec![
            "d".to_string(),
            path_arg(archive),
            normalize_selector(entry),
            "-y".to_string(),
        ];
        self.run(archive, args).await
    }

    async fn add_dir(&self, archive: &Path, source_dir: &Path) -> LauncherResult<()> {
        // Trailing `/*` adds the directory's contents rather than the directory.
        let args = vec![
            "a".to_string(),
            path_arg(archive),
            format!("{}/*", path_arg(source_dir)),
            "-y".to_string(),
        ];
        self.run(archive, args).await
    }
}
