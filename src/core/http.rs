use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

use crate::core::state::InstallSettings;

const APP_USER_AGENT: &str = concat!("instance-installer/", env!("CARGO_PKG_VERSION"));

/// Shared client for metadata lookups and artifact downloads.
///
/// The upstream services never time out on their own, so connect/read limits
/// come from the settings file.
pub fn build_http_client(settings: &InstallSettings) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .read_timeout(Duration::from_secs(settings.read_timeout_secs))
        .build()
}
