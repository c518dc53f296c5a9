use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::{normalize_selector, selector_matches, ArchiveTool};
use crate::core::error::{LauncherError, LauncherResult};

/// In-process zip/jar handling built on the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipTool;

#[async_trait]
impl ArchiveTool for ZipTool {
    async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        selector: Option<&str>,
    ) -> LauncherResult<()> {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        let selector = selector.map(normalize_selector);
        run_blocking(archive.clone(), move || {
            extract_blocking(&archive, &dest, selector.as_deref())
        })
        .await
    }

    async fn delete(&self, archive: &Path, entry: &str) -> LauncherResult<()> {
        let archive = archive.to_path_buf();
        let entry = normalize_selector(entry);
        run_blocking(archive.clone(), move || {
            rewrite_blocking(&archive, |name| selector_matches(name, &entry), &[])
        })
        .await
    }

    async fn add_dir(&self, archive: &Path, source_dir: &Path) -> LauncherResult<()> {
        let archive = archive.to_path_buf();
        let source_dir = source_dir.to_path_buf();
        run_blocking(archive.clone(), move || {
            let additions = collect_files(&source_dir)?;
            let replaced: HashSet<String> = additions.iter().map(|(n, _)| n.clone()).collect();
            rewrite_blocking(&archive, |name| replaced.contains(name), &additions)
        })
        .await
    }
}

/// Runs `op` on the blocking pool and turns any failure into an archive
/// error whose detail is the underlying message.
async fn run_blocking<F>(archive: PathBuf, op: F) -> LauncherResult<()>
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| LauncherError::Other(format!("archive task panicked: {e}")))?;
    outcome.map_err(|detail| LauncherError::Archive { archive, detail })
}

fn extract_blocking(archive: &Path, dest: &Path, selector: Option<&str>) -> Result<(), String> {
    let file = File::open(archive).map_err(|e| format!("cannot open archive: {e}"))?;
    let mut zip = ZipArchive::new(file).map_err(|e| e.to_string())?;
    fs::create_dir_all(dest).map_err(|e| e.to_string())?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| e.to_string())?;
        let name = entry.name().to_string();
        if let Some(sel) = selector {
            if !selector_matches(&name, sel) {
                continue;
            }
        }

        let Some(relative) = entry.enclosed_name() else {
            return Err(format!("unsafe entry path: {name}"));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| e.to_string())?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let mut out = File::create(&out_path).map_err(|e| e.to_string())?;
        io::copy(&mut entry, &mut out).map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Entry names (forward slashes) and paths of every file under `root`.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>, String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| e.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| e.to_string())?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, entry.path().to_path_buf()));
    }
    Ok(files)
}

/// Rewrites `archive` into a sibling temp file, dropping entries for which
/// `skip` is true and appending `additions`, then renames it into place.
fn rewrite_blocking(
    archive: &Path,
    skip: impl Fn(&str) -> bool,
    additions: &[(String, PathBuf)],
) -> Result<(), String> {
    let source = File::open(archive).map_err(|e| format!("cannot open archive: {e}"))?;
    let mut reader = ZipArchive::new(source).map_err(|e| e.to_string())?;

    let tmp_path = archive.with_extension("rewrite.tmp");
    let tmp = File::create(&tmp_path).map_err(|e| e.to_string())?;
    let mut writer = ZipWriter::new(tmp);

    let result = (|| -> Result<(), String> {
        for i in 0..reader.len() {
            let entry = reader.by_index_raw(i).map_err(|e| e.to_string())?;
            if skip(entry.name()) {
                continue;
            }
            writer.raw_copy_file(entry).map_err(|e| e.to_string())?;
        }
        let options = SimpleFileOptions::default();
        for (name, path) in additions {
            writer.start_file(name.as_str(), options).map_err(|e| e.to_string())?;
            let mut input = File::open(path).map_err(|e| e.to_string())?;
            io::copy(&mut input, &mut writer).map_err(|e| e.to_string())?;
        }
        writer.finish().map_err(|e| e.to_string())?;
        Ok(())
    })();

    match result {
        Ok(()) => fs::rename(&tmp_path, archive).map_err(|e| e.to_string()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Read, Write};

    /// Builds a zip at `path` from `(name, contents)` pairs.
    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    pub(crate) fn entry_names(path: &Path) -> Vec<String> {
        let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    pub(crate) fn read_entry(path: &Path, name: &str) -> String {
        let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn extract_with_selector_keeps_only_subtree() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("addon.zip");
        write_zip(
            &archive,
            &[
                ("manifest.json", "{}"),
                ("overrides/config/a.cfg", "a"),
                ("overrides/scripts/b.zs", "b"),
            ],
        );

        let out = dir.path().join("out");
        ZipTool.extract(&archive, &out, Some("overrides")).await.unwrap();

        assert!(out.join("overrides/config/a.cfg").exists());
        assert!(out.join("overrides/scripts/b.zs").exists());
        assert!(!out.join("manifest.json").exists());
    }

    #[tokio::test]
    async fn extract_full_without_selector() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("x/y.txt", "y"), ("z.txt", "z")]);

        let out = dir.path().join("out");
        ZipTool.extract(&archive, &out, None).await.unwrap();
        assert_eq!(fs::read_to_string(out.join("x/y.txt")).unwrap(), "y");
        assert_eq!(fs::read_to_string(out.join("z.txt")).unwrap(), "z");
    }

    #[tokio::test]
    async fn unmatched_selector_extracts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("z.txt", "z")]);

        let out = dir.path().join("out");
        ZipTool.extract(&archive, &out, Some("overrides")).await.unwrap();
        assert!(!out.join("z.txt").exists());
    }

    #[tokio::test]
    async fn failure_carries_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, "this is not a zip").unwrap();

        let err = ZipTool.extract(&bogus, dir.path(), None).await.unwrap_err();
        match err {
            LauncherError::Archive { archive, detail } => {
                assert_eq!(archive, bogus);
                assert!(!detail.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let missing = ZipTool
            .extract(&dir.path().join("nope.zip"), dir.path(), None)
            .await
            .unwrap_err();
        assert!(matches!(missing, LauncherError::Archive { .. }));
    }

    #[tokio::test]
    async fn delete_strips_directory() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("client.jar");
        write_zip(
            &jar,
            &[
                ("META-INF/MANIFEST.MF", "m"),
                ("META-INF/MOJANG_C.SF", "s"),
                ("net/minecraft/client/Minecraft.class", "c"),
            ],
        );

        ZipTool.delete(&jar, "META-INF").await.unwrap();
        assert_eq!(entry_names(&jar), vec!["net/minecraft/client/Minecraft.class"]);
    }

    #[tokio::test]
    async fn add_dir_merges_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("client.jar");
        write_zip(&jar, &[("a.class", "old"), ("b.class", "keep")]);

        let patch = dir.path().join("patch");
        fs::create_dir_all(patch.join("cpw/mods")).unwrap();
        fs::write(patch.join("a.class"), "new").unwrap();
        fs::write(patch.join("cpw/mods/Loader.class"), "fml").unwrap();

        ZipTool.add_dir(&jar, &patch).await.unwrap();

        assert_eq!(
            entry_names(&jar),
            vec!["a.class", "b.class", "cpw/mods/Loader.class"]
        );
        assert_eq!(read_entry(&jar, "a.class"), "new");
        assert_eq!(read_entry(&jar, "b.class"), "keep");
    }
}
