use std::env;
use std::path::{Path, PathBuf};

use super::schema::Settings;

const ENV_PREFIX: &str = "CLICKWHEEL";
const CONFIG_PATH_VAR: &str = "CLICKWHEEL_CONFIG_PATH";
const APP_DIR: &str = "clickwheel";

/// Layers, lowest first: struct defaults, the TOML file, then
/// `CLICKWHEEL__<SECTION>__<KEY>` environment variables.
impl Settings {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Load with an explicit config file. A missing file is not an error.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(::config::File::from(path).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err("playback.volume must be within [0, 1]".to_string());
        }
        if self.playback.persist_interval_secs == 0 {
            return Err("playback.persist_interval_secs must be >= 1".to_string());
        }
        if !self.playback.restart_threshold_secs.is_finite()
            || self.playback.restart_threshold_secs < 0.0
        {
            return Err("playback.restart_threshold_secs must be >= 0".to_string());
        }
        if self.catalog.cache_ttl_secs == 0 {
            return Err("catalog.cache_ttl_secs must be >= 1".to_string());
        }
        if url::Url::parse(&self.catalog.api_base).is_err() {
            return Err("catalog.api_base must be an absolute URL".to_string());
        }
        if self.catalog.folder.trim().is_empty() {
            return Err("catalog.folder must not be empty".to_string());
        }
        if self.audio.progress_interval_ms == 0 {
            return Err("audio.progress_interval_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.controls.volume_step) {
            return Err("controls.volume_step must be within [0, 1]".to_string());
        }
        Ok(())
    }
}

/// `$CLICKWHEEL_CONFIG_PATH` when set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    non_blank_var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/clickwheel/config.toml`, or `~/.config/clickwheel/config.toml`.
/// Blank variables count as unset.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = non_blank_var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_blank_var("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join(APP_DIR).join("config.toml"))
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
