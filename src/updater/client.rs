use crate::catalog::{UpdateCatalog, UpdateStep};
use crate::error::{Result, UpdaterError};
use crate::repository::{Credentials, UpdateSource};
use crate::updater::download;
use reqwest::blocking::Client;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_UPDATER_URL: &str = "https://updater.factorio.com";
const MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// Client for the Factorio update service
pub struct UpdaterClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl UpdaterClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let client = Self::build_client()?;
        let base_url = Self::validate_base_url(base_url)?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Fetch every package's update records (`get-available-versions`).
    pub fn fetch_catalog(&self) -> Result<UpdateCatalog> {
        let url = self.endpoint("get-available-versions", &[])?;
        let body = self.get_text(url, "version information")?;
        UpdateCatalog::from_json(&body)
    }

    /// Ask the service where the delta for `step` is hosted (`get-download-link`).
    pub fn fetch_download_link(&self, package: &str, step: &UpdateStep) -> Result<String> {
        let url = self.endpoint(
            "get-download-link",
            &[
                ("package", package),
                ("from", step.from.as_str()),
                ("to", step.to.as_str()),
            ],
        )?;
        let body = self.get_text(url, "download link")?;

        let links: Vec<String> = serde_json::from_str(&body)?;
        links.into_iter().next().ok_or_else(|| {
            UpdaterError::Catalog(format!("no download link returned for {package} {step}"))
        })
    }

    fn get_text(&self, url: Url, what: &str) -> Result<String> {
        debug!("Fetching {what}: {}", Self::redacted(&url));

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| UpdaterError::Catalog(format!("failed to fetch {what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::Catalog(format!(
                "failed to fetch {what}: HTTP {}",
                status.as_u16()
            )));
        }

        let declared = response.content_length();
        read_limited(response, declared, MAX_RESPONSE_BYTES, what)
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                UpdaterError::Validation(format!("Invalid updater URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(name);

        let mut pairs = self.credentials.query_pairs();
        pairs.extend_from_slice(params);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    /// URL with the token replaced, for logging.
    fn redacted(url: &Url) -> Url {
        let mut redacted = url.clone();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if k == "token" { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), value)
            })
            .collect();
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
        redacted
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("factorio-updater/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpdaterError::Io(std::io::Error::other(e)))
    }

    fn validate_base_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url)
            .map_err(|_| UpdaterError::Validation(format!("Invalid updater URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(UpdaterError::Validation(format!(
                    "Unsupported updater URL scheme: {scheme}"
                )));
            }
        }

        if parsed.host_str().is_none() {
            return Err(UpdaterError::Validation(format!(
                "Updater URL has no host: {url}"
            )));
        }

        Ok(parsed)
    }
}

/// Read a response body, giving up once it grows past `limit` bytes.
fn read_limited<R: Read>(
    body: R,
    declared_len: Option<u64>,
    limit: u64,
    what: &str,
) -> Result<String> {
    let too_large = || UpdaterError::Catalog(format!("{what} response exceeded {limit} bytes"));

    if declared_len.is_some_and(|len| len > limit) {
        return Err(too_large());
    }

    let mut text = String::new();
    body.take(limit + 1)
        .read_to_string(&mut text)
        .map_err(|e| UpdaterError::Catalog(format!("failed to read {what}: {e}")))?;

    if text.len() as u64 > limit {
        return Err(too_large());
    }

    Ok(text)
}

impl UpdateSource for UpdaterClient {
    fn fetch_catalog(&self) -> Result<UpdateCatalog> {
        UpdaterClient::fetch_catalog(self)
    }

    fn fetch_download_link(&self, package: &str, step: &UpdateStep) -> Result<String> {
        UpdaterClient::fetch_download_link(self, package, step)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        download::download_to_file(&self.client, url, dest)
    }
}
