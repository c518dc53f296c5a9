// ─── Forge ───
// The installer artifact is reused from the data store when its MD5 matches
// Forge's published meta.json, and downloaded again otherwise. What happens to
// it next depends on the Minecraft version (see `ForgeEra`).

mod fmllibs;
mod legacy;
mod modern;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::context::InstallContext;
use super::installer::LoaderInstaller;
use crate::core::downloader::{Downloader, LibraryDescriptor};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::state::LauncherPaths;
use crate::core::version::ForgeEra;

pub use fmllibs::{fml_libraries_for, FmlLibrary};
pub use modern::{ForgeDefinition, InstallSection, VersionSection};

/// Installs Forge from its official installer (or, for old versions, its
/// client/universal zip).
pub struct ForgeInstaller;

/// Files a single Forge install works with.
pub(crate) struct ForgeWorkspace {
    /// Working copy of the installer, always removed when the install ends.
    pub installer: PathBuf,
    /// Long-lived copy in the data store.
    pub cached: PathBuf,
    /// Scratch directory for extracted entries.
    pub scratch: PathBuf,
    /// Merged `{install, version}` document.
    pub definition: PathBuf,
}

impl ForgeWorkspace {
    pub fn new(paths: &LauncherPaths, loader_version: &str) -> Self {
        let temp = paths.temp_dir();
        Self {
            installer: temp.join(format!("{loader_version}.jar")),
            cached: paths.forge_installer_cache(loader_version),
            scratch: temp.join(format!("forge-{loader_version}")),
            definition: paths.forge_definition_cache(loader_version),
        }
    }
}

impl ForgeInstaller {
    /// Puts a usable installer at `ws.installer`, preferring the cached copy.
    async fn obtain_installer(
        &self,
        ctx: &InstallContext<'_>,
        era: ForgeEra,
        ws: &ForgeWorkspace,
    ) -> LauncherResult<()> {
        match self.try_reuse(ctx, era, ws).await {
            Ok(()) => {
                info!("Reusing cached Forge installer {:?}", ws.cached);
                return Ok(());
            }
            Err(e) => warn!("Cached Forge installer not usable ({}), downloading it", e),
        }

        let lv = &ctx.loader.loader_version;
        let url = format!(
            "{}/{}/forge-{}-{}",
            ctx.settings.forge_maven_base.trim_end_matches('/'),
            lv,
            lv,
            era.artifact_suffix()
        );
        ctx.fetcher.fetch(&url, &ws.installer, None).await?;
        fsutil::copy_file(&ws.installer, &ws.cached).await?;
        Ok(())
    }

    async fn try_reuse(
        &self,
        ctx: &InstallContext<'_>,
        era: ForgeEra,
        ws: &ForgeWorkspace,
    ) -> LauncherResult<()> {
        if !fsutil::exists(&ws.cached).await {
            return Err(LauncherError::Loader("no cached installer".into()));
        }
        if !era.is_legacy() && !fsutil::exists(&ws.definition).await {
            return Err(LauncherError::Loader("no cached Forge definition".into()));
        }

        let meta = ctx.metadata.forge_meta(&ctx.loader.loader_version).await?;
        let (classifier, extension) = era.hash_classifier();
        let expected = meta.md5(classifier, extension).ok_or_else(|| {
            LauncherError::Loader(format!("meta.json has no {classifier}.{extension} hash"))
        })?;
        let actual = Downloader::md5_file(&ws.cached).await?;
        if actual != expected {
            return Err(LauncherError::Loader(format!(
                "installer hash mismatch: expected {expected}, got {actual}"
            )));
        }

        fsutil::copy_file(&ws.cached, &ws.installer).await
    }
}

#[async_trait]
impl LoaderInstaller for ForgeInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> LauncherResult<Vec<LibraryDescriptor>> {
        let era = ForgeEra::for_minecraft(&ctx.loader.mc_version)?;
        info!(
            "Installing Forge {} for Minecraft {} ({:?})",
            ctx.loader.loader_version, ctx.loader.mc_version, era
        );
        let ws = ForgeWorkspace::new(ctx.paths, &ctx.loader.loader_version);

        let result = async {
            self.obtain_installer(&ctx, era, &ws).await?;
            if era.is_legacy() {
                legacy::install(&ctx, &ws).await
            } else {
                modern::install(&ctx, &ws).await
            }
        }
        .await;

        if let Err(e) = fsutil::remove_file_if_exists(&ws.installer).await {
            warn!("Failed to remove temp installer: {}", e);
        }
        if let Ok(libraries) = &result {
            debug!("Forge resolved {} libraries", libraries.len());
        }
        result
    }
}
