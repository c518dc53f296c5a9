use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Supported mod loaders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    Forge,
    Fabric,
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Forge => write!(f, "forge"),
            LoaderType::Fabric => write!(f, "fabric"),
        }
    }
}

/// Where the instance's content manifest comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    #[default]
    Curseforge,
    Ftb,
}

/// Which loader to install, for which game version. Fixed for the duration
/// of an install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoaderSpec {
    pub loader_type: LoaderType,
    pub mc_version: String,
    pub loader_version: String,
    #[serde(default)]
    pub source: ContentSource,
}

/// A resolved mod as recorded in the instance config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModManifestEntry {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
    pub file_name: String,
    #[serde(default)]
    pub display_name: String,
    pub download_url: String,
    /// Addon name as shown by the package registry.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_date: Option<String>,
}

/// The persisted `config.json` of an instance.
///
/// Unknown top-level keys written by other tools are carried in `extra` so a
/// read-merge-write never loses them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderSpec>,
    #[serde(default)]
    pub time_played: u64,
    /// Empty when the pack has none; always written.
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub mods: Vec<ModManifestEntry>,
    #[serde(default)]
    pub overrides: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys the UI layer attaches to in-memory instances; never persisted.
pub const RUNTIME_ONLY_KEYS: [&str; 2] = ["queue", "name"];

impl InstanceConfig {
    /// Drops runtime-only keys that may have leaked into `extra`.
    pub fn without_runtime_keys(mut self) -> Self {
        for key in RUNTIME_ONLY_KEYS {
            self.extra.remove(key);
        }
        self
    }
}
