use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::LoaderSpec;

/// One file the instance needs: where it comes from, where it goes, and
/// optionally the SHA-1 it must hash to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryDescriptor {
    pub url: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl LibraryDescriptor {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
            sha1: None,
        }
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }
}

/// Ordered set of descriptors keyed by destination path.
///
/// Pushing a descriptor for a path that is already queued replaces the old
/// one in place, so later stages win without reordering the queue.
#[derive(Debug, Default, Clone)]
pub struct DownloadQueue {
    entries: Vec<LibraryDescriptor>,
    index: HashMap<PathBuf, usize>,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, descriptor: LibraryDescriptor) {
        match self.index.get(&descriptor.path) {
            Some(&i) => self.entries[i] = descriptor,
            None => {
                self.index.insert(descriptor.path.clone(), self.entries.len());
                self.entries.push(descriptor);
            }
        }
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = LibraryDescriptor>) {
        for d in descriptors {
            self.push(d);
        }
    }

    /// Fails on the first descriptor whose destination is not absolute and
    /// under one of `roots`, or that contains `.` or `..` components.
    pub fn ensure_rooted(&self, roots: &[&Path]) -> LauncherResult<()> {
        for d in &self.entries {
            let plain = d.path.components().all(|c| {
                matches!(c, Component::Normal(_) | Component::RootDir | Component::Prefix(_))
            });
            let rooted =
                plain && d.path.is_absolute() && roots.iter().any(|r| d.path.starts_with(r));
            if !rooted {
                return Err(LauncherError::UnsafePath(d.path.to_string_lossy().to_string()));
            }
        }
        Ok(())
    }

    pub fn into_vec(self) -> Vec<LibraryDescriptor> {
        self.entries
    }
}

/// What the orchestrator hands to the download executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadJob {
    pub instance_name: String,
    pub loader: LoaderSpec,
    pub background: Option<String>,
    pub files: Vec<LibraryDescriptor>,
}
