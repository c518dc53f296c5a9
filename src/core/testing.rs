// Hand-written fakes for the network-facing traits, shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::core::api::{Addon, AddonFile, CategorySection, ForgeMeta, MetadataService};
use crate::core::downloader::ArtifactFetcher;
use crate::core::error::{LauncherError, LauncherResult};

#[derive(Default)]
pub struct FakeMetadata {
    addons: HashMap<u64, Addon>,
    files: HashMap<(u64, u64), AddonFile>,
    failing: HashSet<u64>,
    fabric: Option<Value>,
    forge: Option<ForgeMeta>,
    latency: Duration,

    pub fabric_calls: AtomicUsize,
    pub forge_meta_calls: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    in_flight: AtomicUsize,
    addon_calls: Mutex<HashMap<u64, Vec<Instant>>>,
}

impl FakeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolvable mod: addon `project_id` with file `file_id`.
    pub fn with_mod(mut self, project_id: u64, file_id: u64, category: Option<&str>) -> Self {
        self.addons.insert(
            project_id,
            Addon {
                id: project_id,
                name: format!("Addon {project_id}"),
                category_section: category.map(|p| CategorySection {
                    path: Some(p.to_string()),
                }),
            },
        );
        self.files.insert(
            (project_id, file_id),
            AddonFile {
                id: file_id,
                file_name: format!("addon-{project_id}-{file_id}.jar"),
                display_name: format!("Addon {project_id} file {file_id}"),
                download_url: format!("https://cdn.example/{project_id}/{file_id}.jar"),
                file_date: None,
            },
        );
        self
    }

    /// Every lookup of this project fails.
    pub fn with_failing(mut self, project_id: u64) -> Self {
        self.failing.insert(project_id);
        self
    }

    pub fn with_fabric(mut self, profile: Value) -> Self {
        self.fabric = Some(profile);
        self
    }

    pub fn with_forge_meta(mut self, meta: ForgeMeta) -> Self {
        self.forge = Some(meta);
        self
    }

    /// Simulated time each addon lookup takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn addon_attempts(&self, project_id: u64) -> Vec<Instant> {
        self.addon_calls
            .lock()
            .unwrap()
            .get(&project_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MetadataService for FakeMetadata {
    async fn addon(&self, project_id: u64) -> LauncherResult<Addon> {
        self.addon_calls
            .lock()
            .unwrap()
            .entry(project_id)
            .or_default()
            .push(Instant::now());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&project_id) {
            return Err(LauncherError::LoaderApi(format!("addon {project_id} unavailable")));
        }
        self.addons
            .get(&project_id)
            .cloned()
            .ok_or_else(|| LauncherError::LoaderApi(format!("addon {project_id} not found")))
    }

    async fn addon_file(&self, project_id: u64, file_id: u64) -> LauncherResult<AddonFile> {
        self.files
            .get(&(project_id, file_id))
            .cloned()
            .ok_or_else(|| LauncherError::LoaderApi(format!("file {project_id}/{file_id} not found")))
    }

    async fn fabric_profile(&self, _mc: &str, _loader: &str) -> LauncherResult<Value> {
        self.fabric_calls.fetch_add(1, Ordering::SeqCst);
        self.fabric
            .clone()
            .ok_or_else(|| LauncherError::LoaderApi("fabric meta unavailable".into()))
    }

    async fn forge_meta(&self, _loader_version: &str) -> LauncherResult<ForgeMeta> {
        self.forge_meta_calls.fetch_add(1, Ordering::SeqCst);
        self.forge
            .clone()
            .ok_or_else(|| LauncherError::LoaderApi("forge meta unavailable".into()))
    }
}

/// Serves fixed files by URL and records every request.
#[derive(Default)]
pub struct FakeFetcher {
    files: HashMap<String, Vec<u8>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, url: impl Into<String>, contents: Vec<u8>) -> Self {
        self.files.insert(url.into(), contents);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path, _sha1: Option<&str>) -> LauncherResult<()> {
        self.requests.lock().unwrap().push(url.to_string());
        let Some(contents) = self.files.get(url) else {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            });
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, contents)?;
        Ok(())
    }
}
