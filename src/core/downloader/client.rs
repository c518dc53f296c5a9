use std::path::Path;

use async_trait::async_trait;
use md5::Md5;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Fetches a single remote artifact onto disk.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Downloads `url` to `dest`, creating parent directories and validating
    /// the SHA-1 when one is given. A file already at `dest` with that SHA-1
    /// is left alone.
    async fn fetch(&self, url: &str, dest: &Path, sha1: Option<&str>) -> LauncherResult<()>;
}

/// HTTP artifact fetcher.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Lowercase hex MD5 of a file on disk.
    pub async fn md5_file(path: &Path) -> LauncherResult<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Ok(hex::encode(Md5::digest(&bytes)))
    }

    /// Check an existing file against an expected SHA-1.
    pub async fn validate_sha1(path: &Path, expected: &str) -> LauncherResult<bool> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        Ok(hex::encode(Sha1::digest(&bytes)).eq_ignore_ascii_case(expected))
    }
}

#[async_trait]
impl ArtifactFetcher for Downloader {
    async fn fetch(&self, url: &str, dest: &Path, sha1: Option<&str>) -> LauncherResult<()> {
        if let Some(expected) = sha1 {
            if dest.is_file() && Self::validate_sha1(dest, expected).await? {
                debug!("Already present: {:?}", dest);
                return Ok(());
            }
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        if let Some(expected) = sha1 {
            let actual = hex::encode(Sha1::digest(&bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LauncherError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        // Scoped so the handle is closed before anyone renames or copies the file.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn fetch_writes_file_and_creates_parents() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/forge.jar");
                then.status(200).body("jar-bytes");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/dir/forge.jar");
        let downloader = Downloader::new(Client::new());
        downloader
            .fetch(&server.url("/forge.jar"), &dest, None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read(&dest).unwrap(), b"jar-bytes");
    }

    #[tokio::test]
    async fn fetch_rejects_sha1_mismatch_without_writing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/lib.jar");
                then.status(200).body("payload");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("lib.jar");
        let err = Downloader::new(Client::new())
            .fetch(&server.url("/lib.jar"), &dest, Some("0000"))
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::Sha1Mismatch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn fetch_reports_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.jar");
                then.status(404);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = Downloader::new(Client::new())
            .fetch(&server.url("/missing.jar"), &dir.path().join("m.jar"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::DownloadFailed { status: 404, .. }));
    }

    #[tokio::test]
    async fn fetch_skips_file_with_matching_sha1() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/lib.jar");
                then.status(200).body("fresh");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("lib.jar");
        std::fs::write(&dest, b"hello").unwrap();
        let downloader = Downloader::new(Client::new());

        downloader
            .fetch(
                &server.url("/lib.jar"),
                &dest,
                Some("aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"),
            )
            .await
            .unwrap();
        assert_eq!(mock.hits_async().await, 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");

        // A stale file is replaced.
        downloader
            .fetch(&server.url("/lib.jar"), &dest, Some(&hex::encode(Sha1::digest(b"fresh"))))
            .await
            .unwrap();
        assert_eq!(mock.hits_async().await, 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn hashes_match_known_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"hello").unwrap();

        assert_eq!(
            Downloader::md5_file(&path).await.unwrap(),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert!(Downloader::validate_sha1(&path, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d")
            .await
            .unwrap());
    }
}
