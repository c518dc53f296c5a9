use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables read from `installer_settings.json`. Every field has a default so a
/// partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallSettings {
    /// Ceiling on concurrent mod resolutions.
    pub mod_concurrency: usize,
    /// Attempts per mod reference, first try included.
    pub mod_attempts: u32,
    pub retry_delay_secs: u64,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub addon_api_base: String,
    pub fabric_meta_base: String,
    pub forge_maven_base: String,
    pub forge_files_base: String,
    pub fml_libs_forge_base: String,
    pub fml_libs_alternate_base: String,
    /// When set, archives go through this 7-Zip binary instead of the built-in zip tool.
    pub seven_zip_path: Option<PathBuf>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            mod_concurrency: 10,
            mod_attempts: 3,
            retry_delay_secs: 5,
            connect_timeout_secs: 15,
            read_timeout_secs: 60,
            addon_api_base: "https://addons-ecr.forgesvc.net/api/v2".into(),
            fabric_meta_base: "https://meta.fabricmc.net/v2".into(),
            forge_maven_base: "https://maven.minecraftforge.net/net/minecraftforge/forge".into(),
            forge_files_base: "https://files.minecraftforge.net/net/minecraftforge/forge".into(),
            fml_libs_forge_base: "https://files.minecraftforge.net/fmllibs".into(),
            fml_libs_alternate_base: "https://fmllibs.gdevs.io".into(),
            seven_zip_path: None,
        }
    }
}

impl InstallSettings {
    /// Loads settings from disk, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring corrupt settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
