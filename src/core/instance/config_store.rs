use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use super::model::InstanceConfig;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::LauncherPaths;

/// Read-merge-write access to every instance's `config.json`.
///
/// Each instance name gets its own async mutex, so updates to one instance
/// run one at a time in arrival order while different instances proceed
/// independently. Writes go to a temp file in the same directory which is
/// then renamed over `config.json`; readers only ever see a complete file.
pub struct InstanceConfigStore {
    paths: LauncherPaths,
    snapshots: Mutex<HashMap<String, InstanceConfig>>,
    queues: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InstanceConfigStore {
    pub fn new(paths: LauncherPaths) -> Self {
        Self {
            paths,
            snapshots: Mutex::new(HashMap::new()),
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Canonical in-memory copy of an instance's config, if one is known.
    pub fn snapshot(&self, instance_name: &str) -> Option<InstanceConfig> {
        lock_map(&self.snapshots).get(instance_name).cloned()
    }

    /// Hydrates the in-memory copy from disk. Returns `None` when the
    /// instance has no config file yet.
    pub async fn load(&self, instance_name: &str) -> LauncherResult<Option<InstanceConfig>> {
        let queue = self.queue_for(instance_name);
        let _turn = queue.lock().await;
        let loaded = self.read_from_disk(instance_name).await?;
        if let Some(config) = &loaded {
            lock_map(&self.snapshots).insert(instance_name.to_string(), config.clone());
        }
        Ok(loaded)
    }

    /// Applies `update` to the instance's current config and persists the result.
    ///
    /// The file is only written when it already exists or `force_write` is
    /// set; otherwise just the in-memory copy changes.
    pub async fn update<F>(
        &self,
        instance_name: &str,
        update: F,
        force_write: bool,
    ) -> LauncherResult<InstanceConfig>
    where
        F: FnOnce(InstanceConfig) -> InstanceConfig + Send,
    {
        self.update_document(
            instance_name,
            |current| match serde_json::from_value::<InstanceConfig>(current.clone()) {
                Ok(config) => serde_json::to_value(update(config)).unwrap_or(Value::Null),
                Err(_) => current,
            },
            force_write,
        )
        .await
    }

    /// Like [`update`](Self::update) but on the raw JSON document, for callers
    /// that edit keys this crate does not model.
    pub async fn update_document<F>(
        &self,
        instance_name: &str,
        update: F,
        force_write: bool,
    ) -> LauncherResult<InstanceConfig>
    where
        F: FnOnce(Value) -> Value + Send,
    {
        let queue = self.queue_for(instance_name);
        let _turn = queue.lock().await;

        let current = self.current(instance_name).await?;
        let current = serde_json::to_value(current.without_runtime_keys())?;
        let candidate = update(current);

        let (serialized, config) = validate(instance_name, &candidate)?;

        let config_path = self.paths.config_path(instance_name);
        let exists = tokio::fs::symlink_metadata(&config_path).await.is_ok();
        if exists || force_write {
            self.write_atomically(instance_name, &serialized).await?;
        } else {
            debug!(
                "No config on disk for {}, updating in memory only",
                instance_name
            );
        }

        lock_map(&self.snapshots).insert(instance_name.to_string(), config.clone());
        Ok(config)
    }

    fn queue_for(&self, instance_name: &str) -> Arc<tokio::sync::Mutex<()>> {
        lock_map(&self.queues)
            .entry(instance_name.to_string())
            .or_default()
            .clone()
    }

    async fn current(&self, instance_name: &str) -> LauncherResult<InstanceConfig> {
        if let Some(config) = self.snapshot(instance_name) {
            return Ok(config);
        }
        Ok(self
            .read_from_disk(instance_name)
            .await?
            .unwrap_or_default())
    }

    async fn read_from_disk(&self, instance_name: &str) -> LauncherResult<Option<InstanceConfig>> {
        let path = self.paths.config_path(instance_name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LauncherError::io(path, e)),
        };
        let config: InstanceConfig =
            serde_json::from_str(&raw).map_err(|e| LauncherError::Config {
                instance: instance_name.to_string(),
                reason: format!("existing config.json is corrupt: {e}"),
            })?;
        Ok(Some(config.without_runtime_keys()))
    }

    async fn write_atomically(&self, instance_name: &str, contents: &str) -> LauncherResult<()> {
        let config_path = self.paths.config_path(instance_name);
        let temp_path = self.paths.config_temp_path(instance_name);

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        write_synced(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &config_path)
            .await
            .map_err(|e| LauncherError::io(&config_path, e))?;

        debug!("Wrote {:?}", config_path);
        Ok(())
    }
}

/// The candidate must survive a JSON round trip as an object matching the
/// config schema. Returns the serialized text and the typed config.
fn validate(instance_name: &str, candidate: &Value) -> LauncherResult<(String, InstanceConfig)> {
    let reject = |reason: String| {
        error!("Cannot write this JSON to {}: {}", instance_name, reason);
        LauncherError::Config {
            instance: instance_name.to_string(),
            reason,
        }
    };

    let serialized =
        serde_json::to_string(candidate).map_err(|e| reject(format!("not serializable: {e}")))?;
    let reparsed: Value =
        serde_json::from_str(&serialized).map_err(|e| reject(format!("not parsable: {e}")))?;
    if !reparsed.is_object() {
        return Err(reject("not an object".to_string()));
    }
    let config: InstanceConfig =
        serde_json::from_value(reparsed).map_err(|e| reject(format!("schema mismatch: {e}")))?;

    let config = config.without_runtime_keys();
    let serialized =
        serde_json::to_string(&config).map_err(|e| reject(format!("not serializable: {e}")))?;
    Ok((serialized, config))
}

async fn write_synced(path: &Path, contents: &str) -> LauncherResult<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    file.sync_all()
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    Ok(())
}

fn lock_map<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
