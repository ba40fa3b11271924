//! Where the player is deployed and which repository that implies.
//!
//! Everything here is a pure function of explicit inputs (host, path,
//! overrides) so it can be tested without touching the environment.

use tracing::warn;
use url::Url;

use crate::storage::{OWNER_OVERRIDE_KEY, REPO_OVERRIDE_KEY, Storage};

use super::model::RepoLocator;

const PAGES_SUFFIX: &str = ".github.io";

/// The host and path the player was served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub host: String,
    pub path: String,
}

impl Deployment {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Parse a site URL such as `https://alice.github.io/player/`.
    pub fn from_site_url(site_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(site_url)?;
        Ok(Self {
            host: url.host_str().unwrap_or_default().to_string(),
            path: url.path().to_string(),
        })
    }

    /// First non-empty path segment, if any.
    pub fn first_segment(&self) -> Option<&str> {
        self.path.split('/').find(|s| !s.is_empty())
    }

    /// Identity used to keep independently deployed instances apart in
    /// storage: host followed by the first path segment.
    pub fn origin_id(&self) -> String {
        format!("{}{}", self.host, self.first_segment().unwrap_or_default())
    }
}

/// Manually configured owner/repository, used when the host is not a
/// GitHub Pages domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl SourceOverrides {
    /// Read the two override keys. Storage failures count as "not set".
    pub fn from_storage(storage: &dyn Storage) -> Self {
        let read = |key: &str| match storage.get(key) {
            Ok(v) => v.filter(|s| !s.trim().is_empty()),
            Err(e) => {
                warn!(key, error = %e, "failed to read source override");
                None
            }
        };
        Self {
            owner: read(OWNER_OVERRIDE_KEY),
            repo: read(REPO_OVERRIDE_KEY),
        }
    }

    fn locator(&self) -> Option<RepoLocator> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => Some(RepoLocator::new(owner.trim(), repo.trim())),
            _ => None,
        }
    }
}

/// Resolve the content source for `deployment`.
///
/// `<owner>.github.io/<repo>/...` maps to `owner/repo`; a bare
/// `<owner>.github.io` is the user site repository `owner/<owner>.github.io`.
/// Any other host needs both overrides, otherwise there is no source.
pub fn resolve_repo(deployment: &Deployment, overrides: &SourceOverrides) -> Option<RepoLocator> {
    let host = deployment.host.to_ascii_lowercase();
    if let Some(owner) = host.strip_suffix(PAGES_SUFFIX).filter(|o| !o.is_empty()) {
        let repo = match deployment.first_segment() {
            Some(segment) => segment.to_string(),
            None => format!("{owner}{PAGES_SUFFIX}"),
        };
        return Some(RepoLocator::new(owner, repo));
    }

    overrides.locator()
}
