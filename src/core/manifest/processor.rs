use std::path::{Path, PathBuf};

use futures_util::{stream, StreamExt};
use tracing::{debug, error, info, warn};

use super::{ContentManifest, ModReference};
use crate::core::api::MetadataService;
use crate::core::archive::ArchiveTool;
use crate::core::downloader::LibraryDescriptor;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::fsutil;
use crate::core::instance::ModManifestEntry;
use crate::core::state::{safe_join, InstallSettings, LauncherPaths};

/// Name of the pack archive inside the instance's temp directory.
pub const PACK_ARCHIVE: &str = "addon.zip";

/// What a content manifest resolved to.
#[derive(Debug, Clone, Default)]
pub struct ResolvedManifest {
    pub mod_manifests: Vec<ModManifestEntry>,
    pub mods_to_download: Vec<LibraryDescriptor>,
    /// Absolute paths of every file under `override_root`.
    pub override_files: Vec<PathBuf>,
    pub override_root: PathBuf,
    /// References that could not be resolved within the attempt budget.
    pub dropped: Vec<ModReference>,
}

/// Resolves a pack's mod references against the package registry and unpacks
/// its override files.
pub struct PackageManifestProcessor<'a> {
    pub paths: &'a LauncherPaths,
    pub settings: &'a InstallSettings,
    pub metadata: &'a dyn MetadataService,
    pub archive: &'a dyn ArchiveTool,
}

impl PackageManifestProcessor<'_> {
    pub async fn resolve(
        &self,
        instance_name: &str,
        manifest: &ContentManifest,
        overrides_only: bool,
    ) -> LauncherResult<ResolvedManifest> {
        let instance_dir = self.paths.instance_dir(instance_name);
        let concurrency = self.settings.mod_concurrency.max(1);
        info!(
            "Resolving {} mods for {} (concurrency={})",
            manifest.files.len(),
            instance_name,
            concurrency
        );

        let mut results: Vec<_> = stream::iter(manifest.files.iter().copied().enumerate())
            .map(|(index, reference)| {
                let instance_dir = &instance_dir;
                async move {
                    let resolved = self.resolve_with_retry(instance_dir, reference).await;
                    (index, reference, resolved)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        // Completion order varies between runs; manifest order does not.
        results.sort_by_key(|(index, _, _)| *index);

        let mut out = ResolvedManifest::default();
        for (_, reference, resolved) in results {
            match resolved {
                Some((entry, descriptor)) => {
                    out.mod_manifests.push(entry);
                    out.mods_to_download.push(descriptor);
                }
                None => out.dropped.push(reference),
            }
        }

        let (root, files) = self
            .unpack_overrides(instance_name, manifest, overrides_only)
            .await?;
        out.override_root = root;
        out.override_files = files;

        info!(
            "Resolved {} mods ({} dropped), {} override files",
            out.mod_manifests.len(),
            out.dropped.len(),
            out.override_files.len()
        );
        Ok(out)
    }

    async fn resolve_with_retry(
        &self,
        instance_dir: &Path,
        reference: ModReference,
    ) -> Option<(ModManifestEntry, LibraryDescriptor)> {
        let attempts = self.settings.mod_attempts.max(1);
        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.settings.retry_delay()).await;
            }
            match self.resolve_one(instance_dir, reference).await {
                Ok(resolved) => return Some(resolved),
                Err(e @ LauncherError::UnsafePath(_)) => {
                    error!(
                        "Dropping mod {}/{}: {}",
                        reference.project_id, reference.file_id, e
                    );
                    return None;
                }
                Err(e) => warn!(
                    "Resolving mod {}/{} failed (attempt {}/{}): {}",
                    reference.project_id, reference.file_id, attempt, attempts, e
                ),
            }
        }
        error!(
            "Dropping mod {}/{} after {} attempts",
            reference.project_id, reference.file_id, attempts
        );
        None
    }

    async fn resolve_one(
        &self,
        instance_dir: &Path,
        reference: ModReference,
    ) -> LauncherResult<(ModManifestEntry, LibraryDescriptor)> {
        let addon = self.metadata.addon(reference.project_id).await?;
        let file = self
            .metadata
            .addon_file(reference.project_id, reference.file_id)
            .await?;

        let dest = safe_join(
            instance_dir,
            Path::new(addon.install_dir()).join(&file.file_name),
        )?;
        debug!("Mod {} -> {:?}", file.file_name, dest);

        let descriptor = LibraryDescriptor::new(&file.download_url, dest);
        let entry = ModManifestEntry {
            project_id: reference.project_id,
            file_id: reference.file_id,
            file_name: file.file_name,
            display_name: file.display_name,
            download_url: file.download_url,
            name: addon.name,
            file_date: file.file_date,
        };
        Ok((entry, descriptor))
    }

    /// Extracts the pack archive (everything, or only its overrides) into the
    /// instance's temp directory and lists the override files.
    async fn unpack_overrides(
        &self,
        instance_name: &str,
        manifest: &ContentManifest,
        overrides_only: bool,
    ) -> LauncherResult<(PathBuf, Vec<PathBuf>)> {
        let temp = self.paths.instance_temp_dir(instance_name);
        let root = safe_join(&temp, &manifest.overrides)?;
        let archive = temp.join(PACK_ARCHIVE);

        if fsutil::exists(&archive).await {
            let selector = overrides_only.then_some(manifest.overrides.as_str());
            self.archive.extract(&archive, &temp, selector).await?;
        } else {
            info!("No pack archive at {:?}, skipping overrides", archive);
        }

        let files = fsutil::files_recursive(&root).await?;
        Ok((root, files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::{write_zip, ZipTool};
    use crate::core::testing::FakeMetadata;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn manifest(ids: impl IntoIterator<Item = u64>) -> ContentManifest {
        ContentManifest {
            files: ids
                .into_iter()
                .map(|id| ModReference {
                    project_id: id,
                    file_id: id * 10,
                })
                .collect(),
            ..ContentManifest::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_is_bounded_to_ten_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        let settings = InstallSettings::default();
        let mut metadata = FakeMetadata::new().with_latency(Duration::from_millis(200));
        for id in 1..=25 {
            metadata = metadata.with_mod(id, id * 10, None);
        }
        let processor = PackageManifestProcessor {
            paths: &paths,
            settings: &settings,
            metadata: &metadata,
            archive: &ZipTool,
        };

        let resolved = processor
            .resolve("pack", &manifest(1..=25), true)
            .await
            .unwrap();

        assert_eq!(resolved.mod_manifests.len(), 25);
        assert_eq!(resolved.mods_to_download.len(), 25);
        assert!(resolved.dropped.is_empty());
        let peak = metadata.max_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 10, "peak concurrency was {peak}");
        assert!(peak > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_reference_is_retried_then_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        let settings = InstallSettings::default();
        let metadata = FakeMetadata::new()
            .with_mod(1, 10, None)
            .with_mod(3, 30, Some("resourcepacks"))
            .with_failing(2);
        let processor = PackageManifestProcessor {
            paths: &paths,
            settings: &settings,
            metadata: &metadata,
            archive: &ZipTool,
        };

        let resolved = processor
            .resolve("pack", &manifest([1, 2, 3]), true)
            .await
            .unwrap();

        let attempts = metadata.addon_attempts(2);
        assert_eq!(attempts.len(), 3);
        for pair in attempts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(5));
        }
        assert_eq!(metadata.addon_attempts(1).len(), 1);

        assert_eq!(
            resolved.dropped,
            vec![ModReference {
                project_id: 2,
                file_id: 20
            }]
        );
        let mut projects: Vec<u64> = resolved.mod_manifests.iter().map(|m| m.project_id).collect();
        projects.sort();
        assert_eq!(projects, vec![1, 3]);

        let instance = paths.instance_dir("pack");
        let mut dests: Vec<PathBuf> = resolved
            .mods_to_download
            .iter()
            .map(|d| d.path.clone())
            .collect();
        dests.sort();
        assert_eq!(
            dests,
            vec![
                instance.join("mods/addon-1-10.jar"),
                instance.join("resourcepacks/addon-3-30.jar"),
            ]
        );
    }

    #[tokio::test]
    async fn escaping_category_is_dropped_without_retry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        let settings = InstallSettings::default();
        let metadata = FakeMetadata::new().with_mod(4, 40, Some("../../outside"));
        let processor = PackageManifestProcessor {
            paths: &paths,
            settings: &settings,
            metadata: &metadata,
            archive: &ZipTool,
        };

        let resolved = processor
            .resolve("pack", &manifest([4]), true)
            .await
            .unwrap();
        assert_eq!(resolved.dropped.len(), 1);
        assert_eq!(metadata.addon_attempts(4).len(), 1);
    }

    #[tokio::test]
    async fn overrides_are_enumerated_from_the_pack_archive() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        let settings = InstallSettings::default();
        let metadata = FakeMetadata::new();
        let temp = paths.instance_temp_dir("pack");
        write_zip(
            &temp.join(PACK_ARCHIVE),
            &[
                ("manifest.json", "{}"),
                ("overrides/config/a.cfg", "a"),
                ("overrides/scripts/deep/b.zs", "b"),
            ],
        );
        let processor = PackageManifestProcessor {
            paths: &paths,
            settings: &settings,
            metadata: &metadata,
            archive: &ZipTool,
        };

        let resolved = processor
            .resolve("pack", &manifest(Vec::<u64>::new()), true)
            .await
            .unwrap();

        let root = temp.join("overrides");
        assert_eq!(resolved.override_root, root);
        assert_eq!(
            resolved.override_files,
            vec![root.join("config/a.cfg"), root.join("scripts/deep/b.zs")]
        );
        assert!(!temp.join("manifest.json").exists());

        processor
            .resolve("pack", &manifest(Vec::<u64>::new()), false)
            .await
            .unwrap();
        assert!(temp.join("manifest.json").exists());
    }

    #[tokio::test]
    async fn missing_pack_archive_means_no_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        let settings = InstallSettings::default();
        let metadata = FakeMetadata::new();
        let processor = PackageManifestProcessor {
            paths: &paths,
            settings: &settings,
            metadata: &metadata,
            archive: &ZipTool,
        };

        let resolved = processor
            .resolve("pack", &manifest(Vec::<u64>::new()), false)
            .await
            .unwrap();
        assert!(resolved.override_files.is_empty());
    }
}
