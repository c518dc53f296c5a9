use std::path::{Component, Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

const APP_DIR_NAME: &str = "GDInstaller";

pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_TEMP_FILE: &str = "config_new_temp.json";
pub const LOCK_FILE: &str = "installing.lock";

/// Snapshot of the on-disk layout every component works against.
///
/// ```text
/// <data_dir>/
///   instances/<name>/config.json
///   instances/<name>/installing.lock
///   instances/<name>/lib/            legacy Forge libraries
///   libraries/                       maven mirror
///   versions/<mc>.jar                vanilla client jars
///   datastore/forgeInstallers/       cached Forge installers
///   temp/                            scratch space
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    data_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Platform data directory, e.g. `~/.local/share/GDInstaller`.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(APP_DIR_NAME))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.data_dir.join("instances")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    pub fn minecraft_versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    pub fn data_store_dir(&self) -> PathBuf {
        self.data_dir.join("datastore")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join("temp")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("installer_settings.json")
    }

    pub fn instance_dir(&self, instance_name: &str) -> PathBuf {
        self.instances_dir().join(instance_name)
    }

    pub fn config_path(&self, instance_name: &str) -> PathBuf {
        self.instance_dir(instance_name).join(CONFIG_FILE)
    }

    pub fn config_temp_path(&self, instance_name: &str) -> PathBuf {
        self.instance_dir(instance_name).join(CONFIG_TEMP_FILE)
    }

    pub fn lock_path(&self, instance_name: &str) -> PathBuf {
        self.instance_dir(instance_name).join(LOCK_FILE)
    }

    /// Scratch directory a manifest's archive is unpacked into.
    pub fn instance_temp_dir(&self, instance_name: &str) -> PathBuf {
        self.temp_dir().join(instance_name)
    }

    /// Root that override files are taken relative to.
    pub fn overrides_temp_dir(&self, instance_name: &str) -> PathBuf {
        self.instance_temp_dir(instance_name).join("overrides")
    }

    pub fn forge_installer_cache(&self, loader_version: &str) -> PathBuf {
        self.data_store_dir()
            .join("forgeInstallers")
            .join(format!("{loader_version}.jar"))
    }

    pub fn forge_definition_cache(&self, loader_version: &str) -> PathBuf {
        self.libraries_dir()
            .join("net")
            .join("minecraftforge")
            .join(loader_version)
            .join(format!("{loader_version}.json"))
    }

    pub fn fabric_definition_cache(&self, mc_version: &str, loader_version: &str) -> PathBuf {
        self.libraries_dir()
            .join("net")
            .join("fabricmc")
            .join(mc_version)
            .join(loader_version)
            .join("fabric.json")
    }
}

/// Joins `relative` onto `root`, refusing anything that could climb out of it.
pub fn safe_join(root: &Path, relative: impl AsRef<Path>) -> LauncherResult<PathBuf> {
    let relative = relative.as_ref();
    if relative.as_os_str().is_empty() {
        return Err(LauncherError::UnsafePath(String::new()));
    }
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(LauncherError::UnsafePath(
                    relative.to_string_lossy().to_string(),
                ))
            }
        }
    }
    Ok(root.join(relative))
}

/// Accepts only a single plain path segment, as used for instance names and
/// version strings that become directory or file names.
pub fn validate_path_segment(value: &str) -> LauncherResult<()> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !value.contains(['/', '\\']) => Ok(()),
        _ => Err(LauncherError::UnsafePath(value.to_string())),
    }
}
