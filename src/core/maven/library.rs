use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{MavenArtifact, MOJANG_LIBRARIES};
use crate::core::downloader::LibraryDescriptor;
use crate::core::state::safe_join;

/// A library as listed by Fabric profiles and Forge version/install JSONs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEntry {
    pub name: String,
    /// Repository base the coordinate resolves against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientreq: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryArtifact {
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl LibraryEntry {
    pub fn artifact(&self) -> Option<MavenArtifact> {
        MavenArtifact::parse(&self.name).ok()
    }

    /// Maps the entry to a download under `libs_dir`.
    ///
    /// Explicit `downloads.artifact` metadata wins; otherwise the coordinate is
    /// resolved against the entry's own repository (Mojang's by default).
    pub fn to_descriptor(&self, libs_dir: &Path) -> Option<LibraryDescriptor> {
        if let Some(artifact) = self.downloads.as_ref().and_then(|d| d.artifact.as_ref()) {
            if !artifact.url.is_empty() {
                let path = match safe_join(libs_dir, &artifact.path) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Skipping library {}: {}", self.name, e);
                        return None;
                    }
                };
                let descriptor = LibraryDescriptor::new(&artifact.url, path);
                return Some(match &artifact.sha1 {
                    Some(sha1) => descriptor.with_sha1(sha1),
                    None => descriptor,
                });
            }
        }

        let Some(coord) = self.artifact() else {
            warn!("Skipping library with invalid coordinate: {}", self.name);
            return None;
        };
        let repo = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(MOJANG_LIBRARIES);

        match safe_join(libs_dir, coord.local_path()) {
            Ok(path) => Some(LibraryDescriptor::new(coord.url(repo), path)),
            Err(e) => {
                warn!("Skipping library {}: {}", self.name, e);
                None
            }
        }
    }
}

/// Maps loader library entries to descriptors, dropping server-only entries.
pub fn map_libraries<'a>(
    entries: impl IntoIterator<Item = &'a LibraryEntry>,
    libs_dir: &Path,
) -> Vec<LibraryDescriptor> {
    entries
        .into_iter()
        .filter(|e| e.clientreq != Some(false))
        .filter_map(|e| e.to_descriptor(libs_dir))
        .collect()
}
