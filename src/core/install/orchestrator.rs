use std::path::{Component, Path};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::core::downloader::{DownloadJob, DownloadQueue};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::instance::{ContentSource, InstanceConfig, LoaderSpec};
use crate::core::loaders::{InstallContext, Installer};
use crate::core::manifest::{
    ContentManifest, ModReference, PackageManifestProcessor, ResolvedManifest,
};
use crate::core::state::{safe_join, validate_path_segment, AppState};

/// One install as requested by the caller.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub instance_name: String,
    pub loader: LoaderSpec,
    pub manifest: ContentManifest,
    pub background: Option<String>,
    /// Play time to record when the instance has none yet.
    pub time_played: Option<u64>,
    /// Extract only the pack's override directory instead of the whole archive.
    pub overrides_only: bool,
}

impl InstallRequest {
    /// The instance name and both versions become path segments under the
    /// data directory, so each must be a single plain name.
    pub fn validate(&self) -> LauncherResult<()> {
        validate_path_segment(&self.instance_name)?;
        validate_path_segment(&self.loader.mc_version)?;
        validate_path_segment(&self.loader.loader_version)
    }
}

/// What an install produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub job: DownloadJob,
    /// Mod references given up on after exhausting their attempts.
    pub dropped: Vec<ModReference>,
}

/// Runs an install end to end and hands the resulting download job to the
/// executor listening on `jobs`.
pub struct DownloadOrchestrator {
    state: Arc<AppState>,
    jobs: UnboundedSender<DownloadJob>,
}

impl DownloadOrchestrator {
    pub fn new(state: Arc<AppState>, jobs: UnboundedSender<DownloadJob>) -> Self {
        Self { state, jobs }
    }

    pub async fn install(&self, request: InstallRequest) -> LauncherResult<InstallReport> {
        request.validate()?;
        let state = &self.state;
        let name = request.instance_name.as_str();
        let instance_dir = state.paths.instance_dir(name);
        info!(
            "Installing instance {} ({} {} for {})",
            name,
            request.loader.loader_type,
            request.loader.loader_version,
            request.loader.mc_version
        );

        // 1. Loader
        let ctx = InstallContext {
            instance_name: name,
            loader: &request.loader,
            paths: &state.paths,
            settings: &state.settings,
            metadata: state.metadata.as_ref(),
            fetcher: state.fetcher.as_ref(),
            archive: state.archive.as_ref(),
        };
        let loader_libraries = Installer::new(request.loader.loader_type)
            .install(ctx)
            .await?;

        // 2. Content
        let resolved = self.resolve_content(&request).await?;

        // 3-4. Let watchers see the override copy, then mark the install again.
        state.lock.release(name).await;
        fsutil::create_dir_all(&instance_dir).await?;
        state.lock.acquire(name).await;

        // 5. Overrides
        let mut overrides = Vec::with_capacity(resolved.override_files.len());
        for file in &resolved.override_files {
            let relative = file.strip_prefix(&resolved.override_root).map_err(|_| {
                LauncherError::UnsafePath(file.to_string_lossy().to_string())
            })?;
            let dest = safe_join(&instance_dir, relative)?;
            fsutil::copy_file(file, &dest).await?;
            overrides.push(to_forward_slashes(relative));
        }

        // 6. Scratch
        fsutil::remove_dir_if_exists(&state.paths.instance_temp_dir(name)).await?;

        // 7. Queue
        let mut queue = DownloadQueue::new();
        queue.extend(loader_libraries);
        queue.extend(resolved.mods_to_download);
        let libraries_dir = state.paths.libraries_dir();
        queue.ensure_rooted(&[libraries_dir.as_path(), instance_dir.as_path()])?;

        let job = DownloadJob {
            instance_name: name.to_string(),
            loader: request.loader.clone(),
            background: request.background.clone(),
            files: queue.into_vec(),
        };
        info!("Queueing {} files for {}", job.files.len(), name);
        if self.jobs.send(job.clone()).is_err() {
            warn!("Download executor is gone, job for {} not delivered", name);
        }

        // 8. Config
        let loader = request.loader.clone();
        let background = request.background.clone();
        let time_played = request.time_played;
        let mod_manifests = resolved.mod_manifests;
        state
            .config_store
            .update(
                name,
                move |mut config: InstanceConfig| {
                    config.loader = Some(loader);
                    if config.time_played == 0 {
                        config.time_played = time_played.unwrap_or(0);
                    }
                    config.background = background.unwrap_or_default();
                    config.mods.retain(|existing| {
                        !mod_manifests.iter().any(|m| {
                            m.project_id == existing.project_id && m.file_id == existing.file_id
                        })
                    });
                    config.mods.extend(mod_manifests);
                    config.overrides = overrides;
                    config
                },
                true,
            )
            .await?;

        Ok(InstallReport {
            job,
            dropped: resolved.dropped,
        })
    }

    async fn resolve_content(&self, request: &InstallRequest) -> LauncherResult<ResolvedManifest> {
        let state = &self.state;
        match request.loader.source {
            ContentSource::Curseforge => {
                let processor = PackageManifestProcessor {
                    paths: &state.paths,
                    settings: &state.settings,
                    metadata: state.metadata.as_ref(),
                    archive: state.archive.as_ref(),
                };
                processor
                    .resolve(&request.instance_name, &request.manifest, request.overrides_only)
                    .await
            }
            ContentSource::Ftb => {
                warn!("FTB manifests carry no resolvable content, installing the loader only");
                Ok(ResolvedManifest {
                    override_root: state.paths.overrides_temp_dir(&request.instance_name),
                    ..ResolvedManifest::default()
                })
            }
        }
    }
}

/// `config/a.cfg` regardless of platform separator.
fn to_forward_slashes(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
