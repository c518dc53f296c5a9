use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use super::{InstallSettings, LauncherPaths};
use crate::core::api::{HttpMetadataService, MetadataService};
use crate::core::archive::{archive_tool_from_settings, ArchiveTool};
use crate::core::downloader::{ArtifactFetcher, Downloader};
use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::instance::{InstanceConfigStore, InstanceLock};

/// Everything an install needs, built once per process.
pub struct AppState {
    pub paths: LauncherPaths,
    pub settings: InstallSettings,
    pub metadata: Arc<dyn MetadataService>,
    pub fetcher: Arc<dyn ArtifactFetcher>,
    pub archive: Arc<dyn ArchiveTool>,
    pub config_store: InstanceConfigStore,
    pub lock: InstanceLock,
}

impl AppState {
    /// Wires the real services for `data_dir`, or the platform data
    /// directory when none is given.
    pub fn load(data_dir: Option<PathBuf>) -> LauncherResult<Self> {
        let paths = match data_dir {
            Some(dir) => LauncherPaths::new(dir),
            None => LauncherPaths::default_location(),
        };
        let settings = InstallSettings::load(&paths.settings_path());
        info!("Using data directory {:?}", paths.data_dir());

        let http_client: Client = build_http_client(&settings)?;
        let metadata = Arc::new(HttpMetadataService::new(http_client.clone(), &settings));
        let fetcher = Arc::new(Downloader::new(http_client));
        let archive = archive_tool_from_settings(&settings);

        Ok(Self::with_services(paths, settings, metadata, fetcher, archive))
    }

    /// Builds the state around caller-supplied services.
    pub fn with_services(
        paths: LauncherPaths,
        settings: InstallSettings,
        metadata: Arc<dyn MetadataService>,
        fetcher: Arc<dyn ArtifactFetcher>,
        archive: Arc<dyn ArchiveTool>,
    ) -> Self {
        Self {
            config_store: InstanceConfigStore::new(paths.clone()),
            lock: InstanceLock::new(paths.clone()),
            paths,
            settings,
            metadata,
            fetcher,
            archive,
        }
    }
}
