use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/clickwheel/config.toml` or `~/.config/clickwheel/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CLICKWHEEL__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Where this player is "deployed". A `*.github.io` URL selects the
    /// repository automatically; anything else needs a manual override.
    pub site_url: String,
    /// Base URL of the content-listing API.
    pub api_base: String,
    /// Repository folder that holds the audio files.
    pub folder: String,
    /// How long a cached listing stays valid (seconds).
    pub cache_ttl_secs: u64,
    /// Timeout for listing requests (seconds).
    pub request_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            site_url: "http://localhost/".to_string(),
            api_base: "https://api.github.com".to_string(),
            folder: "music".to_string(),
            cache_ttl_secs: 3600,
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume used when no saved session exists, in `[0, 1]`.
    pub volume: f32,
    /// "Previous" restarts the current track once playback is past this point (seconds).
    pub restart_threshold_secs: f64,
    /// How often the session snapshot is written to storage (seconds).
    pub persist_interval_secs: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            restart_threshold_secs: 3.0,
            persist_interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Timeout for downloading a track (seconds).
    pub fetch_timeout_secs: u64,
    /// How often the audio thread reports progress (milliseconds).
    pub progress_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
            fetch_timeout_secs: 60,
            progress_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for per-origin storage files. Defaults to the XDG data dir.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ clickwheel ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/clickwheel/clickwheel.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
