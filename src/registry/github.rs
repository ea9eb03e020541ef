use super::{
    Release, ReleaseSource, RequestOptions, Response, ensure_http_url, http_error_message,
    request,
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Latest WinPython release on the GitHub Releases API
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/winpython/winpython/releases/latest";

/// Fetches the latest release from a GitHub "releases/latest" endpoint
pub struct GitHubReleases {
    client: Client,
    url: String,
}

impl GitHubReleases {
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_RELEASE_URL.to_string())
    }

    pub fn with_url(url: String) -> Result<Self> {
        ensure_http_url(&url)?;

        // api.github.com rejects requests without a User-Agent
        let client = Client::builder()
            .gzip(true)
            .user_agent(concat!("wpcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw response without interpreting it
    pub async fn fetch(&self) -> Result<Response> {
        let response = request(&self.client, &self.url, RequestOptions::default()).await?;
        debug!(
            "{} returned HTTP {} ({} bytes)",
            self.url,
            response.status,
            response.body.len()
        );
        Ok(response)
    }
}

/// Turn a fetched response into a release, failing on anything unusable
pub fn parse_release(response: &Response, url: &str) -> Result<Release> {
    if !response.is_success() {
        warn!("Release lookup failed with HTTP {}", response.status);
        return Err(anyhow!(http_error_message(response.status, url)));
    }

    let payload = response
        .decode_json()
        .ok_or_else(|| anyhow!("Response from {} is not valid JSON", url))?;

    serde_json::from_value(payload)
        .with_context(|| format!("Release from {} is missing 'tag_name' or 'assets'", url))
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn latest_release(&self) -> Result<Release> {
        let response = self.fetch().await?;
        parse_release(&response, &self.url)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
