mod processor;

use serde::{Deserialize, Serialize};

pub use processor::{PackageManifestProcessor, ResolvedManifest, PACK_ARCHIVE};

/// One mod pinned by a content manifest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ModReference {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
}

/// A pack's `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft: Option<ManifestTarget>,
    #[serde(default)]
    pub files: Vec<ModReference>,
    /// Directory inside the pack archive holding override files.
    #[serde(default = "default_overrides")]
    pub overrides: String,
}

fn default_overrides() -> String {
    "overrides".to_string()
}

impl Default for ContentManifest {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            minecraft: None,
            files: Vec::new(),
            overrides: default_overrides(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTarget {
    pub version: String,
    #[serde(default)]
    pub mod_loaders: Vec<ManifestModLoader>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestModLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}
