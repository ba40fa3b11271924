//! Durable key/value storage scoped to one deployment origin.
//!
//! This plays the role a browser's per-origin local storage would: small
//! string values under well-known keys. Every failure surfaces as a
//! `StorageError`; callers log it and carry on.

mod file;
mod memory;

use std::sync::Arc;

use crate::error::StorageError;

pub use file::{FileStorage, default_storage_dir};
pub use memory::MemoryStorage;

/// Key of the persisted player session snapshot.
pub const SESSION_KEY: &str = "ipod-player-state";
/// Manual content-source owner, used when the host is not auto-detectable.
pub const OWNER_OVERRIDE_KEY: &str = "dev-github-owner";
/// Manual content-source repository, paired with `OWNER_OVERRIDE_KEY`.
pub const REPO_OVERRIDE_KEY: &str = "dev-github-repo";

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub type SharedStorage = Arc<dyn Storage>;
