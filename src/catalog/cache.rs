//! Time-limited cache of the last successfully resolved track list.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::storage::SharedStorage;

use super::deployment::Deployment;
use super::model::Track;

pub struct CatalogCache {
    storage: SharedStorage,
    key: String,
    timestamp_key: String,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(storage: SharedStorage, deployment: &Deployment, ttl: Duration) -> Self {
        let key = cache_key(deployment);
        let timestamp_key = format!("{key}-timestamp");
        Self {
            storage,
            key,
            timestamp_key,
            ttl,
        }
    }

    /// The cached list, if present, parseable, non-empty and younger than the TTL.
    pub fn load(&self) -> Option<Vec<Track>> {
        self.load_at(SystemTime::now())
    }

    pub fn load_at(&self, now: SystemTime) -> Option<Vec<Track>> {
        let (cached, stamp) = match (self.storage.get(&self.key), self.storage.get(&self.timestamp_key)) {
            (Ok(Some(cached)), Ok(Some(stamp))) => (cached, stamp),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to read cached catalog");
                return None;
            }
            _ => return None,
        };

        let Ok(stamp_ms) = stamp.trim().parse::<u64>() else {
            warn!(key = %self.timestamp_key, "ignoring corrupt catalog timestamp");
            return None;
        };
        let age_ms = millis_since_epoch(now).saturating_sub(stamp_ms);
        if u128::from(age_ms) >= self.ttl.as_millis() {
            return None;
        }

        match serde_json::from_str::<Vec<Track>>(&cached) {
            Ok(tracks) if !tracks.is_empty() => Some(tracks),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "ignoring corrupt cached catalog");
                None
            }
        }
    }

    pub fn store(&self, tracks: &[Track]) {
        self.store_at(tracks, SystemTime::now());
    }

    /// Write `tracks` with capture time `now`. Failures are logged only.
    pub fn store_at(&self, tracks: &[Track], now: SystemTime) {
        let json = match serde_json::to_string(tracks) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize catalog for caching");
                return;
            }
        };

        let result = self
            .storage
            .set(&self.key, &json)
            .and_then(|_| {
                self.storage
                    .set(&self.timestamp_key, &millis_since_epoch(now).to_string())
            });
        if let Err(e) = result {
            warn!(error = %e, "failed to cache catalog");
        }
    }
}

/// `ipod-tracks-<host><first path segment>`.
pub fn cache_key(deployment: &Deployment) -> String {
    format!("ipod-tracks-{}", deployment.origin_id())
}

fn millis_since_epoch(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
