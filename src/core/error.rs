use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the installer pipeline.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive tool reported a failure; `detail` is its own diagnostic output.
    #[error("Archive operation on {archive:?} failed: {detail}")]
    Archive { archive: PathBuf, detail: String },

    // ── Instance ────────────────────────────────────────
    #[error("Cannot write config for instance {instance}: {reason}")]
    Config { instance: String, reason: String },

    #[error("Path escapes its root: {0}")]
    UnsafePath(String),

    // ── Loader ──────────────────────────────────────────
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("Loader error: {0}")]
    Loader(String),

    #[error("Loader API unreachable: {0}")]
    LoaderApi(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Wraps an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}
