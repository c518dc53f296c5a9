use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::context::InstallContext;
use super::installer::LoaderInstaller;
use crate::core::downloader::LibraryDescriptor;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::maven::{map_libraries, LibraryEntry};

/// The part of Fabric's loader profile the installer reads. The cached file
/// keeps the whole document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricProfile {
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

pub struct FabricInstaller;

impl FabricInstaller {
    /// Reads the cached profile for this `(mc, loader)` pair, fetching and
    /// caching it on a miss. The cache is written once and never refreshed.
    async fn load_profile(&self, ctx: &InstallContext<'_>) -> LauncherResult<Value> {
        let cache = ctx
            .paths
            .fabric_definition_cache(&ctx.loader.mc_version, &ctx.loader.loader_version);

        match read_cached(&cache).await {
            Some(profile) => {
                debug!("Using cached Fabric profile {:?}", cache);
                return Ok(profile);
            }
            None => info!("Fabric profile not cached, fetching from meta"),
        }

        let profile = ctx
            .metadata
            .fabric_profile(&ctx.loader.mc_version, &ctx.loader.loader_version)
            .await?;

        if let Some(parent) = cache.parent() {
            fsutil::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&profile)?;
        tokio::fs::write(&cache, json)
            .await
            .map_err(|e| LauncherError::io(&cache, e))?;

        Ok(profile)
    }
}

async fn read_cached(path: &Path) -> Option<Value> {
    let raw = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice(&raw) {
        Ok(profile) => Some(profile),
        Err(e) => {
            warn!("Cached Fabric profile {:?} is unreadable: {}", path, e);
            None
        }
    }
}

#[async_trait]
impl LoaderInstaller for FabricInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> LauncherResult<Vec<LibraryDescriptor>> {
        info!(
            "Installing Fabric {} for Minecraft {}",
            ctx.loader.loader_version, ctx.loader.mc_version
        );

        let raw = self.load_profile(&ctx).await?;
        let profile: FabricProfile = serde_json::from_value(raw)?;

        let libraries = map_libraries(&profile.libraries, &ctx.paths.libraries_dir());
        info!("Fabric resolved {} libraries", libraries.len());
        Ok(libraries)
    }
}
