// Pre-installer Forge (mc <= 1.5.2): FML's libraries come from a static table
// and the loader is merged straight into a copy of the vanilla jar.

use tracing::{debug, info};

use super::fmllibs::fml_libraries_for;
use super::ForgeWorkspace;
use crate::core::downloader::LibraryDescriptor;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::loaders::context::InstallContext;
use crate::core::state::safe_join;

pub(super) async fn install(
    ctx: &InstallContext<'_>,
    ws: &ForgeWorkspace,
) -> LauncherResult<Vec<LibraryDescriptor>> {
    let libraries = fml_descriptors(ctx)?;
    patch_game_jar(ctx, ws).await?;
    info!("Forge resolved {} FML libraries", libraries.len());
    Ok(libraries)
}

fn fml_descriptors(ctx: &InstallContext<'_>) -> LauncherResult<Vec<LibraryDescriptor>> {
    let lib_dir = ctx.paths.instance_dir(ctx.instance_name).join("lib");
    fml_libraries_for(&ctx.loader.mc_version)
        .iter()
        .map(|lib| {
            let base = if lib.alternate_host {
                &ctx.settings.fml_libs_alternate_base
            } else {
                &ctx.settings.fml_libs_forge_base
            };
            let url = format!("{}/{}", base.trim_end_matches('/'), lib.file_name);
            Ok(LibraryDescriptor::new(url, safe_join(&lib_dir, lib.file_name)?).with_sha1(lib.sha1))
        })
        .collect()
}

/// Copies `versions/<mc>.jar` to `versions/<loader>.jar`, strips its
/// signature and merges the whole Forge archive over it.
async fn patch_game_jar(ctx: &InstallContext<'_>, ws: &ForgeWorkspace) -> LauncherResult<()> {
    let versions = ctx.paths.minecraft_versions_dir();
    let base_jar = versions.join(format!("{}.jar", ctx.loader.mc_version));
    let forge_jar = versions.join(format!("{}.jar", ctx.loader.loader_version));

    if !fsutil::exists(&base_jar).await {
        return Err(LauncherError::Loader(format!(
            "base game jar {:?} is missing",
            base_jar
        )));
    }
    fsutil::copy_file(&base_jar, &forge_jar).await?;
    ctx.archive.delete(&forge_jar, "META-INF").await?;

    fsutil::remove_dir_if_exists(&ws.scratch).await?;
    ctx.archive.extract(&ws.installer, &ws.scratch, None).await?;
    ctx.archive.add_dir(&forge_jar, &ws.scratch).await?;
    fsutil::remove_dir_if_exists(&ws.scratch).await?;

    debug!("Patched {:?} with Forge", forge_jar);
    Ok(())
}
