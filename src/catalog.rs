//! Track discovery: remote folder listing, metadata, cover art, TTL cache.
//!
//! `TrackCatalog::load` always leaves the catalog with the best track list it
//! could find (fresh, cached, demo, or the previous one) and an optional
//! descriptive error next to it. It never fails outright.

mod cache;
mod demo;
mod deployment;
mod model;
mod parse;
mod source;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::CatalogSettings;
use crate::error::{CatalogError, ListingError};
use crate::storage::SharedStorage;

pub use cache::{CatalogCache, cache_key};
pub use demo::demo_tracks;
pub use deployment::{Deployment, SourceOverrides, resolve_repo};
pub use model::{ContentEntry, RepoLocator, Track};
pub use parse::{TrackInfo, UNKNOWN_ARTIST, parse_track_info, tracks_from_listing};
pub use source::{ContentSource, GITHUB_V3_ACCEPT, GitHubContents};

pub struct TrackCatalog<S: ContentSource> {
    source: S,
    storage: SharedStorage,
    deployment: Deployment,
    cache: CatalogCache,
    folder: String,

    tracks: Vec<Track>,
    loading: bool,
    error: Option<CatalogError>,
    /// The current list came from the cache because the remote failed.
    stale: bool,
}

impl<S: ContentSource> TrackCatalog<S> {
    pub fn new(
        source: S,
        storage: SharedStorage,
        deployment: Deployment,
        settings: &CatalogSettings,
    ) -> Self {
        let cache = CatalogCache::new(
            storage.clone(),
            &deployment,
            Duration::from_secs(settings.cache_ttl_secs),
        );
        Self {
            source,
            storage,
            deployment,
            cache,
            folder: settings.folder.clone(),
            tracks: Vec::new(),
            // Nothing has been loaded yet.
            loading: true,
            error: None,
            stale: false,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// The message shown next to the track list, if any.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        Some(match (error, self.stale) {
            (CatalogError::RateLimited, true) => "API rate limited. Showing cached tracks.".into(),
            (_, true) => "Failed to load tracks. Showing cached version.".into(),
            (error, false) => error.to_string(),
        })
    }

    /// Flag a load as in progress so the screen can say so before the
    /// (blocking) request goes out.
    pub fn mark_loading(&mut self) {
        self.loading = true;
    }

    pub fn refresh(&mut self) -> &[Track] {
        self.load(true)
    }

    /// Produce the track list for this deployment.
    ///
    /// Unless `force_refresh`, a still-valid cache short-circuits the network.
    pub fn load(&mut self, force_refresh: bool) -> &[Track] {
        self.loading = true;
        self.error = None;
        self.stale = false;

        self.load_inner(force_refresh);

        self.loading = false;
        &self.tracks
    }

    fn load_inner(&mut self, force_refresh: bool) {
        if !force_refresh {
            if let Some(cached) = self.cache.load() {
                info!(count = cached.len(), "using cached catalog");
                self.tracks = cached;
                return;
            }
        }

        let overrides = SourceOverrides::from_storage(self.storage.as_ref());
        let Some(repo) = resolve_repo(&self.deployment, &overrides) else {
            if let Some(cached) = self.cache.load() {
                info!(count = cached.len(), "no content source detected, using cached catalog");
                self.tracks = cached;
            } else {
                info!(
                    host = %self.deployment.host,
                    "no content source detected, using demo catalog; deploy to GitHub Pages or set a source override"
                );
                self.tracks = demo_tracks();
            }
            return;
        };

        info!(owner = %repo.owner, repo = %repo.repo, folder = %self.folder, "fetching catalog");
        match self.source.list_folder(&repo, &self.folder) {
            Err(ListingError::Status(403)) => {
                warn!("content listing rate limited");
                self.fall_back_to_cache(CatalogError::RateLimited);
            }
            Err(ListingError::Status(404)) => {
                warn!(folder = %self.folder, "content folder not found");
                self.error = Some(CatalogError::FolderNotFound {
                    folder: self.folder.clone(),
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch catalog");
                self.fall_back_to_cache(CatalogError::FetchFailed(e.to_string()));
            }
            Ok(entries) => {
                let tracks = tracks_from_listing(&entries);
                if tracks.is_empty() {
                    warn!(entries = entries.len(), "no playable tracks in listing");
                    self.error = Some(CatalogError::NoTracksFound {
                        folder: self.folder.clone(),
                    });
                    return;
                }

                info!(count = tracks.len(), "catalog loaded");
                self.cache.store(&tracks);
                self.tracks = tracks;
            }
        }
    }

    /// Use the cache if there is one (marking the list stale), otherwise keep
    /// whatever list we already had. `error` is reported either way.
    fn fall_back_to_cache(&mut self, error: CatalogError) {
        if let Some(cached) = self.cache.load() {
            info!(count = cached.len(), "showing cached catalog");
            self.tracks = cached;
            self.stale = true;
        }
        self.error = Some(error);
    }
}
