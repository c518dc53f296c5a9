// Installer-era Forge (mc > 1.5.2): everything comes out of install_profile.json.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ForgeWorkspace;
use crate::core::downloader::LibraryDescriptor;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::loaders::context::InstallContext;
use crate::core::maven::{map_libraries, LibraryEntry, MavenArtifact};
use crate::core::state::safe_join;

const INSTALL_PROFILE: &str = "install_profile.json";

/// The document cached at `libraries/net/minecraftforge/<v>/<v>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeDefinition {
    pub install: InstallSection,
    pub version: VersionSection,
}

/// Installer metadata. `path` is the maven coordinate of Forge's own binary;
/// `file_path` names it inside the installer when it is shipped as a single
/// entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Version JSON shipped next to the profile (split profiles only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionSection {
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

impl ForgeDefinition {
    /// Version libraries followed by installer libraries, minus Forge itself.
    pub fn libraries(&self) -> Vec<LibraryEntry> {
        self.version
            .libraries
            .iter()
            .chain(&self.install.libraries)
            .filter(|lib| !lib.artifact().is_some_and(|a| a.is_forge_binary()))
            .cloned()
            .collect()
    }
}

pub(super) async fn install(
    ctx: &InstallContext<'_>,
    ws: &ForgeWorkspace,
) -> LauncherResult<Vec<LibraryDescriptor>> {
    fsutil::remove_dir_if_exists(&ws.scratch).await?;
    let result = install_in_scratch(ctx, ws).await;
    if let Err(e) = fsutil::remove_dir_if_exists(&ws.scratch).await {
        warn!("Failed to clean Forge scratch dir {:?}: {}", ws.scratch, e);
    }
    result
}

async fn install_in_scratch(
    ctx: &InstallContext<'_>,
    ws: &ForgeWorkspace,
) -> LauncherResult<Vec<LibraryDescriptor>> {
    let definition = read_definition(ctx, ws).await?;

    if let Some(parent) = ws.definition.parent() {
        fsutil::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string(&definition)?;
    tokio::fs::write(&ws.definition, json)
        .await
        .map_err(|e| LauncherError::io(&ws.definition, e))?;
    debug!("Wrote Forge definition {:?}", ws.definition);

    let parsed: ForgeDefinition = serde_json::from_value(definition)?;
    stage_binary(ctx, ws, &parsed.install).await?;

    let libraries = map_libraries(&parsed.libraries(), &ctx.paths.libraries_dir());
    info!("Forge resolved {} libraries", libraries.len());
    Ok(libraries)
}

/// Builds the raw `{install, version}` document from the installer.
///
/// Old profiles carry both halves; newer ones are the install half and name a
/// separate version JSON.
async fn read_definition(ctx: &InstallContext<'_>, ws: &ForgeWorkspace) -> LauncherResult<Value> {
    ctx.archive
        .extract(&ws.installer, &ws.scratch, Some(INSTALL_PROFILE))
        .await?;
    let profile_path = ws.scratch.join(INSTALL_PROFILE);
    let mut profile = read_json(&profile_path).await?;

    let definition = match profile.get_mut("install").map(Value::take) {
        Some(install) => {
            let version = profile
                .get_mut("versionInfo")
                .map(Value::take)
                .ok_or_else(|| LauncherError::Loader("install profile has no versionInfo".into()))?;
            serde_json::json!({ "install": install, "version": version })
        }
        None => {
            let name = profile
                .get("json")
                .and_then(Value::as_str)
                .and_then(|j| Path::new(j).file_name())
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    LauncherError::Loader("install profile names no version json".into())
                })?;
            ctx.archive
                .extract(&ws.installer, &ws.scratch, Some(&name))
                .await?;
            let version_path = ws.scratch.join(&name);
            let version = read_json(&version_path).await?;
            fsutil::remove_file_if_exists(&version_path).await?;
            serde_json::json!({ "install": profile, "version": version })
        }
    };

    fsutil::remove_file_if_exists(&profile_path).await?;
    Ok(definition)
}

async fn read_json(path: &Path) -> LauncherResult<Value> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Moves Forge's own binary (and, without a `filePath`, everything next to it
/// in the installer's maven tree) into the libraries directory.
async fn stage_binary(
    ctx: &InstallContext<'_>,
    ws: &ForgeWorkspace,
    install: &InstallSection,
) -> LauncherResult<()> {
    let Some(coord) = install.path.as_deref() else {
        warn!("Forge install profile has no binary path, nothing to stage");
        return Ok(());
    };
    let artifact = MavenArtifact::parse(coord)?;
    let libs_dir = ctx.paths.libraries_dir();

    if let Some(file_path) = install.file_path.as_deref() {
        ctx.archive
            .extract(&ws.installer, &ws.scratch, Some(file_path))
            .await?;
        let staged = safe_join(&ws.scratch, file_path)?;
        let dest = libs_dir.join(artifact.local_path());
        fsutil::move_file(&staged, &dest).await?;
        debug!("Staged Forge binary at {:?}", dest);
        return Ok(());
    }

    let mut segments = artifact.path_segments();
    segments.pop();
    let dir = segments.join("/");
    let inside = format!("maven/{dir}");
    ctx.archive
        .extract(&ws.installer, &ws.scratch, Some(&inside))
        .await?;

    let staged_root = safe_join(&ws.scratch, &inside)?;
    let dest_root = safe_join(&libs_dir, &dir)?;
    for file in fsutil::files_recursive(&staged_root).await? {
        let Ok(relative) = file.strip_prefix(&staged_root) else {
            continue;
        };
        fsutil::move_file(&file, &dest_root.join(relative)).await?;
    }
    fsutil::remove_dir_if_exists(&ws.scratch.join("maven")).await?;
    debug!("Staged Forge maven tree into {:?}", dest_root);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_libraries_skip_forge_binaries() {
        let definition: ForgeDefinition = serde_json::from_value(serde_json::json!({
            "install": {
                "path": "net.minecraftforge:forge:1.12.2-14.23.5.2854",
                "libraries": [{"name": "net.minecraftforge:minecraftforge:9.11.1.965"}]
            },
            "version": {
                "libraries": [
                    {"name": "net.minecraftforge:forge:1.12.2-14.23.5.2854"},
                    {"name": "net.minecraftforge:forgespi:3.2.0"},
                    {"name": "org.scala-lang:scala-library:2.11.1"}
                ]
            }
        }))
        .unwrap();

        let names: Vec<String> = definition.libraries().into_iter().map(|l| l.name).collect();
        assert_eq!(
            names,
            vec!["net.minecraftforge:forgespi:3.2.0", "org.scala-lang:scala-library:2.11.1"]
        );
    }
}
