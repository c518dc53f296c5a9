// ─── Remote metadata ───
// Package registry, Fabric meta and Forge file metadata, behind one trait so
// installers can be exercised against canned responses.

mod http;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::LauncherResult;

pub use http::HttpMetadataService;
pub use types::{Addon, AddonFile, CategorySection, ForgeMeta};

#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Package metadata by project id.
    async fn addon(&self, project_id: u64) -> LauncherResult<Addon>;

    /// A specific file of a package.
    async fn addon_file(&self, project_id: u64, file_id: u64) -> LauncherResult<AddonFile>;

    /// Fabric loader profile JSON for `(mc_version, loader_version)`, verbatim.
    async fn fabric_profile(&self, mc_version: &str, loader_version: &str)
        -> LauncherResult<Value>;

    /// Forge's `meta.json` (published artifact hashes) for a loader version.
    async fn forge_meta(&self, loader_version: &str) -> LauncherResult<ForgeMeta>;
}
