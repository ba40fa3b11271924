//! Folder listings from the GitHub contents API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::config::CatalogSettings;
use crate::error::ListingError;

use super::model::{ContentEntry, RepoLocator};

/// Media type pinning the v3 representation of the contents API.
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

/// Anything that can list the files of one repository folder.
pub trait ContentSource {
    fn list_folder(
        &self,
        repo: &RepoLocator,
        folder: &str,
    ) -> Result<Vec<ContentEntry>, ListingError>;
}

pub struct GitHubContents {
    http: Client,
    api_base: Url,
}

impl GitHubContents {
    pub fn new(settings: &CatalogSettings) -> Result<Self, ListingError> {
        let api_base = Url::parse(&settings.api_base)
            .map_err(|e| ListingError::Transport(format!("invalid API base URL: {e}")))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("clickwheel/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ListingError::Transport(e.to_string()))?;

        Ok(Self { http, api_base })
    }

    /// `{api_base}/repos/{owner}/{repo}/contents/{folder}` with each part
    /// percent-encoded as a single path segment.
    pub fn listing_url(&self, repo: &RepoLocator, folder: &str) -> Result<Url, ListingError> {
        listing_url(&self.api_base, repo, folder)
    }
}

fn listing_url(base: &Url, repo: &RepoLocator, folder: &str) -> Result<Url, ListingError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ListingError::Transport(format!("API base {base} cannot hold a path")))?;
        segments
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
            .extend(folder.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}

impl ContentSource for GitHubContents {
    fn list_folder(
        &self,
        repo: &RepoLocator,
        folder: &str,
    ) -> Result<Vec<ContentEntry>, ListingError> {
        let url = self.listing_url(repo, folder)?;
        debug!(url = %url, "requesting folder listing");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_V3_ACCEPT)
            .send()
            .map_err(|e| ListingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ListingError::Transport(e.to_string()))?;
        parse_listing(&body)
    }
}

/// A folder listing is a JSON array; a single object means the path named a file.
pub fn parse_listing(body: &str) -> Result<Vec<ContentEntry>, ListingError> {
    serde_json::from_str::<Vec<ContentEntry>>(body).map_err(|e| ListingError::Parse(e.to_string()))
}
