use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{Addon, AddonFile, ForgeMeta};
use super::MetadataService;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::InstallSettings;

/// [`MetadataService`] over HTTP, with base URLs taken from the settings.
pub struct HttpMetadataService {
    client: Client,
    addon_api_base: String,
    fabric_meta_base: String,
    forge_files_base: String,
}

impl HttpMetadataService {
    pub fn new(client: Client, settings: &InstallSettings) -> Self {
        Self {
            client,
            addon_api_base: trim(&settings.addon_api_base),
            fabric_meta_base: trim(&settings.fabric_meta_base),
            forge_files_base: trim(&settings.forge_files_base),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> LauncherResult<T> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(LauncherError::LoaderApi(format!(
                "{} returned {}",
                url,
                resp.status()
            )));
        }
        Ok(resp.json::<T>().await?)
    }
}

fn trim(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

#[async_trait]
impl MetadataService for HttpMetadataService {
    async fn addon(&self, project_id: u64) -> LauncherResult<Addon> {
        self.get_json(&format!("{}/addon/{}", self.addon_api_base, project_id))
            .await
    }

    async fn addon_file(&self, project_id: u64, file_id: u64) -> LauncherResult<AddonFile> {
        self.get_json(&format!(
            "{}/addon/{}/file/{}",
            self.addon_api_base, project_id, file_id
        ))
        .await
    }

    async fn fabric_profile(&self, mc_version: &str, loader_version: &str) -> LauncherResult<Value> {
        self.get_json(&format!(
            "{}/versions/loader/{}/{}/profile/json",
            self.fabric_meta_base, mc_version, loader_version
        ))
        .await
    }

    async fn forge_meta(&self, loader_version: &str) -> LauncherResult<ForgeMeta> {
        self.get_json(&format!(
            "{}/{}/meta.json",
            self.forge_files_base, loader_version
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn service(server: &MockServer) -> HttpMetadataService {
        let settings = InstallSettings {
            addon_api_base: server.url("/api/v2/"),
            fabric_meta_base: server.url("/fabric/v2"),
            forge_files_base: server.url("/forge"),
            ..InstallSettings::default()
        };
        HttpMetadataService::new(Client::new(), &settings)
    }

    #[tokio::test]
    async fn addon_and_file_lookups() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/addon/238222");
                then.status(200)
                    .json_body(serde_json::json!({"id": 238222, "name": "JEI"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/addon/238222/file/3043174");
                then.status(200).json_body(serde_json::json!({
                    "id": 3043174,
                    "fileName": "jei_1.12.2-4.16.1.302.jar",
                    "displayName": "jei_1.12.2-4.16.1.302.jar",
                    "downloadUrl": "https://edge.forgecdn.net/files/3043/174/jei_1.12.2-4.16.1.302.jar"
                }));
            })
            .await;

        let api = service(&server);
        let addon = api.addon(238222).await.unwrap();
        assert_eq!(addon.name, "JEI");
        let file = api.addon_file(238222, 3043174).await.unwrap();
        assert_eq!(file.file_name, "jei_1.12.2-4.16.1.302.jar");
    }

    #[tokio::test]
    async fn fabric_and_forge_endpoints() {
        let server = MockServer::start_async().await;
        let fabric = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/fabric/v2/versions/loader/1.19/0.14.9/profile/json");
                then.status(200)
                    .json_body(serde_json::json!({"id": "fabric-loader-0.14.9-1.19", "libraries": []}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/forge/1.12.2-14.23.5.2854/meta.json");
                then.status(200)
                    .json_body(serde_json::json!({"classifiers": {"installer": {"jar": "d41d8cd98f00b204e9800998ecf8427e"}}}));
            })
            .await;

        let api = service(&server);
        let profile = api.fabric_profile("1.19", "0.14.9").await.unwrap();
        assert_eq!(profile["id"], "fabric-loader-0.14.9-1.19");
        fabric.assert_async().await;

        let meta = api.forge_meta("1.12.2-14.23.5.2854").await.unwrap();
        assert_eq!(
            meta.md5("installer", "jar"),
            Some("d41d8cd98f00b204e9800998ecf8427e")
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/addon/1");
                then.status(503);
            })
            .await;

        let err = service(&server).addon(1).await.unwrap_err();
        assert!(matches!(err, LauncherError::LoaderApi(_)));
    }
}
