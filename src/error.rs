//! Error taxonomy shared by the catalog, player and storage layers.
//!
//! None of these are fatal: catalog errors travel next to the best available
//! track list, playback and storage errors are logged and swallowed.

use thiserror::Error;

/// Why the catalog could not produce a fresh track list.
///
/// The `Display` text is what the screen shows when no cached fallback was
/// available; see `TrackCatalog::error_message` for the stale variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("No /{folder} folder found. Add MP3 files to a \"{folder}\" folder in your repository.")]
    FolderNotFound { folder: String },

    #[error("No MP3 files found in /{folder} folder.")]
    NoTracksFound { folder: String },

    #[error("{0}")]
    FetchFailed(String),
}

/// Failure at the content-listing HTTP seam.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// Non-success HTTP status.
    #[error("GitHub API error: {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse listing: {0}")]
    Parse(String),
}

/// Playback failures. Logged only, the transport state machine keeps going.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to start playback: {0}")]
    StartFailed(String),

    #[error("Failed to fetch media: {0}")]
    Fetch(String),

    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("No audio output device: {0}")]
    NoOutput(String),
}

/// Durable storage failures (quota, permissions, corrupt files).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
