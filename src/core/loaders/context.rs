use crate::core::api::MetadataService;
use crate::core::archive::ArchiveTool;
use crate::core::downloader::ArtifactFetcher;
use crate::core::instance::LoaderSpec;
use crate::core::state::{InstallSettings, LauncherPaths};

/// Everything a loader installer needs for one install.
/// Passed by value so the API can grow without breaking installers.
#[derive(Clone, Copy)]
pub struct InstallContext<'a> {
    pub instance_name: &'a str,
    pub loader: &'a LoaderSpec,
    pub paths: &'a LauncherPaths,
    pub settings: &'a InstallSettings,
    pub metadata: &'a dyn MetadataService,
    pub fetcher: &'a dyn ArtifactFetcher,
    pub archive: &'a dyn ArchiveTool,
}
