use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Deployment;
use crate::config::{LoggingSettings, StorageSettings};
use crate::storage::{
    FileStorage, MemoryStorage, OWNER_OVERRIDE_KEY, REPO_OVERRIDE_KEY, SharedStorage, Storage,
    default_storage_dir,
};

/// Command line of the player.
#[derive(Debug, Parser)]
#[command(name = "clickwheel", version)]
#[command(about = "Click-wheel style terminal player for music kept in a GitHub repository", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Site URL of the deployment to play (defaults to `catalog.site_url`)
    pub site_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Store a manual content source for a site
    SetSource {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Site the source applies to
        site_url: Option<String>,
    },
    /// Forget the manual content source for a site
    ClearSource {
        /// Site the source applies to
        site_url: Option<String>,
    },
}

impl Cli {
    /// The site URL named on the command line, if any.
    pub fn site_url(&self) -> Option<&str> {
        match &self.command {
            Some(Commands::SetSource { site_url, .. }) | Some(Commands::ClearSource { site_url }) => {
                site_url.as_deref()
            }
            None => self.site_url.as_deref(),
        }
    }
}

/// Install the `tracing` subscriber writing to the log file.
///
/// The terminal belongs to the UI, so nothing is written to stdout or stderr.
/// Returns the log path, or `None` when logging could not be set up.
pub fn init_logging(settings: &LoggingSettings) -> Option<PathBuf> {
    let path = settings.file.clone().or_else(default_log_path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok()?;
    Some(path)
}

/// `$XDG_STATE_HOME/clickwheel/clickwheel.log` or `~/.local/state/clickwheel/clickwheel.log`.
fn default_log_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        if !xdg.trim().is_empty() {
            return Some(Path::new(&xdg).join("clickwheel").join("clickwheel.log"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    Some(
        Path::new(&home)
            .join(".local")
            .join("state")
            .join("clickwheel")
            .join("clickwheel.log"),
    )
}

/// Open the storage for `deployment`'s origin, falling back to memory.
pub fn open_storage(settings: &StorageSettings, deployment: &Deployment) -> SharedStorage {
    let Some(dir) = settings.dir.clone().or_else(default_storage_dir) else {
        warn!("no storage directory available, session will not persist");
        return Arc::new(MemoryStorage::new());
    };

    match FileStorage::for_origin(&dir, &deployment.origin_id()) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to open storage, session will not persist");
            Arc::new(MemoryStorage::new())
        }
    }
}

/// Persist a manual content source.
pub fn set_source(storage: &dyn Storage, owner: &str, repo: &str) -> Result<(), String> {
    let owner = owner.trim();
    let repo = repo.trim();
    if owner.is_empty() || repo.is_empty() {
        return Err("owner and repository must not be empty".to_string());
    }
    storage
        .set(OWNER_OVERRIDE_KEY, owner)
        .and_then(|_| storage.set(REPO_OVERRIDE_KEY, repo))
        .map_err(|e| e.to_string())
}

pub fn clear_source(storage: &dyn Storage) -> Result<(), String> {
    storage
        .remove(OWNER_OVERRIDE_KEY)
        .and_then(|_| storage.remove(REPO_OVERRIDE_KEY))
        .map_err(|e| e.to_string())
}
