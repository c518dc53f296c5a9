use std::io::ErrorKind;

use tracing::{debug, warn};

use crate::core::state::LauncherPaths;

/// Advisory "install in progress" marker at `instances/<name>/installing.lock`.
///
/// It exists so another session (or the same one after a crash) can tell an
/// install never finished. It does not exclude anything in-process; every
/// failure is logged and swallowed.
#[derive(Debug, Clone)]
pub struct InstanceLock {
    paths: LauncherPaths,
}

impl InstanceLock {
    pub fn new(paths: LauncherPaths) -> Self {
        Self { paths }
    }

    /// Creates the marker. An already-present marker is left alone.
    pub async fn acquire(&self, instance_name: &str) {
        let path = self.paths.lock_path(instance_name);
        let result = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        match result {
            Ok(_) => debug!("Acquired install lock {:?}", path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!("Install lock {:?} already held", path)
            }
            Err(e) => warn!("Cannot create install lock {:?}: {}", path, e),
        }
    }

    /// Removes the marker; a missing marker is not an error.
    pub async fn release(&self, instance_name: &str) {
        let path = self.paths.lock_path(instance_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Released install lock {:?}", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Cannot remove install lock {:?}: {}", path, e),
        }
    }

    pub async fn is_locked(&self, instance_name: &str) -> bool {
        tokio::fs::try_exists(self.paths.lock_path(instance_name))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_release_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(dir.path());
        std::fs::create_dir_all(paths.instance_dir("pack")).unwrap();
        let lock = InstanceLock::new(paths.clone());

        assert!(!lock.is_locked("pack").await);
        lock.acquire("pack").await;
        assert!(lock.is_locked("pack").await);
        assert!(paths.lock_path("pack").exists());

        // Second acquire is tolerated.
        lock.acquire("pack").await;
        assert!(lock.is_locked("pack").await);

        lock.release("pack").await;
        assert!(!lock.is_locked("pack").await);
        // Releasing twice is tolerated.
        lock.release("pack").await;
    }

    #[tokio::test]
    async fn acquire_without_instance_dir_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(LauncherPaths::new(dir.path()));
        lock.acquire("missing").await;
        assert!(!lock.is_locked("missing").await);
    }
}
