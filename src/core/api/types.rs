use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category_section: Option<CategorySection>,
}

/// Tells where files of this package live inside an instance (`mods`,
/// `resourcepacks`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    #[serde(default)]
    pub path: Option<String>,
}

impl Addon {
    /// Instance-relative directory for this package's files.
    pub fn install_dir(&self) -> &str {
        self.category_section
            .as_ref()
            .and_then(|c| c.path.as_deref())
            .filter(|p| !p.is_empty())
            .unwrap_or("mods")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddonFile {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub display_name: String,
    pub download_url: String,
    #[serde(default)]
    pub file_date: Option<String>,
}

/// Forge `meta.json`: `classifiers.<classifier>.<extension> = md5`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForgeMeta {
    #[serde(default)]
    pub classifiers: HashMap<String, HashMap<String, String>>,
}

impl ForgeMeta {
    pub fn md5(&self, classifier: &str, extension: &str) -> Option<&str> {
        self.classifiers
            .get(classifier)
            .and_then(|c| c.get(extension))
            .map(String::as_str)
    }
}
