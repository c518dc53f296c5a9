// ─── Archive tool ───
// Every archive operation the installers need, as a single awaitable call
// that either succeeds or fails carrying the tool's own diagnostic text.

mod seven_zip;
mod zip_tool;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::LauncherResult;
use crate::core::state::InstallSettings;

pub use seven_zip::SevenZip;
pub use zip_tool::ZipTool;

#[cfg(test)]
pub(crate) use zip_tool::tests::{entry_names, read_entry, write_zip};

#[async_trait]
pub trait ArchiveTool: Send + Sync {
    /// Extracts `archive` into `dest`, keeping entry paths.
    ///
    /// With a selector only the entry of that name, or everything below the
    /// directory of that name, is extracted.
    async fn extract(&self, archive: &Path, dest: &Path, selector: Option<&str>)
        -> LauncherResult<()>;

    /// Removes `entry` (and everything below it) from `archive` in place.
    async fn delete(&self, archive: &Path, entry: &str) -> LauncherResult<()>;

    /// Adds every file under `source_dir` to `archive` at its relative path,
    /// overwriting entries of the same name.
    async fn add_dir(&self, archive: &Path, source_dir: &Path) -> LauncherResult<()>;
}

/// Picks the external 7-Zip binary when one is configured, the built-in zip
/// implementation otherwise.
pub fn archive_tool_from_settings(settings: &InstallSettings) -> Arc<dyn ArchiveTool> {
    match &settings.seven_zip_path {
        Some(bin) => Arc::new(SevenZip::new(bin.clone())),
        None => Arc::new(ZipTool),
    }
}

/// Normalises a selector to the forward-slash, no-leading/trailing-slash form
/// archive entry names use.
pub(crate) fn normalize_selector(selector: &str) -> String {
    selector.replace('\\', "/").trim_matches('/').to_string()
}

/// `true` when `entry` is `selector` itself or lives below it.
pub(crate) fn selector_matches(entry: &str, selector: &str) -> bool {
    let entry = entry.trim_end_matches('/');
    entry == selector
        || entry
            .strip_prefix(selector)
            .is_some_and(|rest| rest.starts_with('/'))
}
