//! Live transport state and the part of it that survives a restart.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{SESSION_KEY, SharedStorage, Storage};

/// Transport state plus user preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub current_index: Option<usize>,
    /// True only while the resource is actually producing sound.
    pub is_playing: bool,
    pub current_time: f64,
    /// Zero until the media length is known.
    pub duration: f64,
    pub volume: f32,
    pub shuffle: bool,
    /// Repeat the current track (not the whole list).
    pub loop_track: bool,
}

impl PlayerSession {
    /// An idle session carrying the saved preferences. The saved track and
    /// position are applied later, once there is a track list to resolve them
    /// against.
    pub fn with_preferences(saved: &PersistedSession) -> Self {
        Self {
            current_index: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: saved.volume,
            shuffle: saved.shuffle,
            loop_track: saved.loop_track,
        }
    }

    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            current_index: self.current_index,
            current_time: self.current_time,
            volume: self.volume,
            shuffle: self.shuffle,
            loop_track: self.loop_track,
        }
    }
}

/// The serialized snapshot: `{currentIndex, currentTime, volume, shuffle, loop}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSession {
    #[serde(with = "index_or_minus_one")]
    pub current_index: Option<usize>,
    pub current_time: f64,
    pub volume: f32,
    pub shuffle: bool,
    #[serde(rename = "loop")]
    pub loop_track: bool,
}

impl Default for PersistedSession {
    fn default() -> Self {
        Self {
            current_index: None,
            current_time: 0.0,
            volume: 0.8,
            shuffle: false,
            loop_track: false,
        }
    }
}

impl PersistedSession {
    fn sanitized(mut self) -> Self {
        if !self.current_time.is_finite() || self.current_time < 0.0 {
            self.current_time = 0.0;
        }
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            PersistedSession::default().volume
        };
        self
    }
}

/// `None` is written as `-1`; any negative number reads back as `None`.
mod index_or_minus_one {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(index: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(i) => s.serialize_i64(*i as i64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let raw = f64::deserialize(d)?;
        if raw.is_finite() && raw >= 0.0 {
            Ok(Some(raw as usize))
        } else {
            Ok(None)
        }
    }
}

/// Read the saved snapshot. Missing or unreadable snapshots yield `None`.
pub fn load_session(storage: &dyn Storage) -> Option<PersistedSession> {
    let raw = match storage.get(SESSION_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(error = %e, "failed to read saved session");
            return None;
        }
    };

    match serde_json::from_str::<PersistedSession>(&raw) {
        Ok(saved) => Some(saved.sanitized()),
        Err(e) => {
            warn!(error = %e, "ignoring corrupt saved session");
            None
        }
    }
}

/// Write `snapshot`. Failures are logged and otherwise ignored.
pub fn save_session(storage: &dyn Storage, snapshot: &PersistedSession) {
    let result = serde_json::to_string(snapshot)
        .map_err(crate::error::StorageError::from)
        .and_then(|json| storage.set(SESSION_KEY, &json));
    if let Err(e) = result {
        warn!(error = %e, "failed to save session");
    }
}

/// Writes the snapshot at most once per `interval`.
pub struct SessionPersister {
    storage: SharedStorage,
    interval: Duration,
    last_saved: Instant,
}

impl SessionPersister {
    pub fn new(storage: SharedStorage, interval: Duration, now: Instant) -> Self {
        Self {
            storage,
            interval,
            last_saved: now,
        }
    }

    /// Save if `interval` has elapsed since the last save. Returns whether it saved.
    pub fn maybe_save(&mut self, now: Instant, snapshot: &PersistedSession) -> bool {
        if now.saturating_duration_since(self.last_saved) < self.interval {
            return false;
        }
        self.save_now(now, snapshot);
        true
    }

    pub fn save_now(&mut self, now: Instant, snapshot: &PersistedSession) {
        debug!(index = ?snapshot.current_index, time = snapshot.current_time, "saving session");
        save_session(self.storage.as_ref(), snapshot);
        self.last_saved = now;
    }
}
