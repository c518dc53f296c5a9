use async_trait::async_trait;

use crate::core::downloader::LibraryDescriptor;
use crate::core::error::LauncherResult;
use crate::core::instance::LoaderType;

use super::{context::InstallContext, fabric::FabricInstaller, forge::ForgeInstaller};

#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    /// Prepares the loader on disk and returns the libraries still to fetch.
    async fn install(&self, ctx: InstallContext<'_>) -> LauncherResult<Vec<LibraryDescriptor>>;
}

/// Static dispatcher over the supported loaders, no Box<dyn>.
pub enum Installer {
    Fabric(FabricInstaller),
    Forge(ForgeInstaller),
}

impl Installer {
    pub fn new(loader: LoaderType) -> Self {
        match loader {
            LoaderType::Fabric => Self::Fabric(FabricInstaller),
            LoaderType::Forge => Self::Forge(ForgeInstaller),
        }
    }

    pub async fn install(&self, ctx: InstallContext<'_>) -> LauncherResult<Vec<LibraryDescriptor>> {
        match self {
            Installer::Fabric(i) => i.install(ctx).await,
            Installer::Forge(i) => i.install(ctx).await,
        }
    }
}
