use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::catalog::Track;
use crate::config::PlaybackSettings;
use crate::error::PlaybackError;
use crate::storage::SharedStorage;

use super::navigation::{next_index, prev_index};
use super::resource::{MediaId, PlaybackResource, ResourceEvent};
use super::session::{PersistedSession, PlayerSession, SessionPersister, load_session};

/// The media currently handed to the resource.
#[derive(Debug, Clone)]
struct LoadedMedia {
    id: MediaId,
    path: String,
}

/// Owns the playback resource and keeps `PlayerSession` consistent with it.
///
/// States: Idle (nothing loaded), Loaded (track assigned, silent), Playing
/// (the resource confirmed it is producing sound). `is_playing` is only
/// set from a `Started` event whose token matches the latest request.
pub struct PlaybackController<R: PlaybackResource> {
    resource: R,
    tracks: Vec<Track>,
    session: PlayerSession,

    /// Bumped by every start request, pause, and track change.
    generation: u64,
    /// Token of the start request still waiting for its outcome.
    pending_start: Option<u64>,
    last_media: MediaId,
    loaded: Option<LoadedMedia>,

    /// Saved snapshot waiting for the first non-empty track list.
    restore: Option<PersistedSession>,
    /// Position to jump to once the loaded media can seek.
    pending_seek: Option<f64>,

    persister: SessionPersister,
    restart_threshold: f64,
    rng: StdRng,
    closed: bool,
}

impl<R: PlaybackResource> PlaybackController<R> {
    /// Create a controller, seeding the session from the last saved snapshot.
    pub fn new(
        mut resource: R,
        storage: SharedStorage,
        settings: &PlaybackSettings,
        now: Instant,
    ) -> Self {
        let restore = load_session(storage.as_ref());
        let session = match &restore {
            Some(saved) => {
                info!(index = ?saved.current_index, time = saved.current_time, "restoring session");
                PlayerSession::with_preferences(saved)
            }
            None => PlayerSession::with_preferences(&PersistedSession {
                volume: settings.volume.clamp(0.0, 1.0),
                ..PersistedSession::default()
            }),
        };
        resource.set_volume(session.volume);

        let persister = SessionPersister::new(
            storage,
            Duration::from_secs(settings.persist_interval_secs),
            now,
        );

        Self {
            resource,
            tracks: Vec::new(),
            session,
            generation: 0,
            pending_start: None,
            last_media: 0,
            loaded: None,
            restore,
            pending_seek: None,
            persister,
            restart_threshold: settings.restart_threshold_secs,
            rng: StdRng::from_entropy(),
            closed: false,
        }
    }

    /// Replace the random source used for shuffle.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The assigned track, looked up from the current index.
    pub fn current_track(&self) -> Option<&Track> {
        self.session.current_index.and_then(|i| self.tracks.get(i))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[cfg(test)]
    pub(crate) fn resource(&self) -> &R {
        &self.resource
    }

    #[cfg(test)]
    pub(crate) fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    /// Take a new catalog snapshot.
    ///
    /// The first non-empty list applies the saved session (without playing).
    /// After that the current track is located by path in the new list; if it
    /// is gone, or the list is empty, the controller returns to Idle.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        if self.closed {
            return;
        }
        self.tracks = tracks;

        if self.restore.is_some() {
            if self.tracks.is_empty() {
                return;
            }
            if let Some(saved) = self.restore.take() {
                self.apply_restore(&saved);
            }
            return;
        }

        let Some(loaded) = self.loaded.as_ref() else {
            self.session.current_index = None;
            return;
        };
        match self.tracks.iter().position(|t| t.path == loaded.path) {
            Some(i) => self.session.current_index = Some(i),
            None => {
                info!(path = %loaded.path, "current track left the catalog");
                self.go_idle();
            }
        }
    }

    fn apply_restore(&mut self, saved: &PersistedSession) {
        let Some(index) = saved.current_index else {
            self.session.current_index = None;
            return;
        };
        let index = index.min(self.tracks.len() - 1);
        self.assign(index);
        self.session.current_time = saved.current_time;
        if saved.current_time > 0.0 {
            self.pending_seek = Some(saved.current_time);
        }
        debug!(index, time = saved.current_time, "restored saved track");
    }

    /// Resume the assigned track.
    pub fn play(&mut self) {
        if self.closed {
            return;
        }
        if self.loaded.is_none() {
            let Some(index) = self.session.current_index.filter(|&i| i < self.tracks.len()) else {
                return;
            };
            self.assign(index);
        }
        self.request_start();
    }

    /// Assign `tracks[index]` from position 0 and play it.
    pub fn play_track(&mut self, index: usize) {
        if self.closed || index >= self.tracks.len() {
            return;
        }
        self.assign(index);
        self.request_start();
    }

    pub fn pause(&mut self) {
        if self.closed {
            return;
        }
        self.generation += 1;
        self.pending_start = None;
        self.resource.pause();
        self.session.is_playing = false;
    }

    pub fn toggle_play(&mut self) {
        if self.session.is_playing || self.pending_start.is_some() {
            self.pause();
        } else if self.current_track().is_some() {
            self.play();
        } else if !self.tracks.is_empty() {
            self.play_track(0);
        }
    }

    pub fn next_track(&mut self) {
        if self.closed {
            return;
        }
        let len = self.tracks.len();
        if let Some(i) = next_index(self.session.current_index, len, self.session.shuffle, &mut self.rng) {
            self.play_track(i);
        }
    }

    /// Go to the previous track, or restart the current one once it has
    /// played past the restart threshold.
    pub fn prev_track(&mut self) {
        if self.closed {
            return;
        }
        if self.current_track().is_some() && self.session.current_time > self.restart_threshold {
            self.seek(0.0);
            return;
        }
        let len = self.tracks.len();
        if let Some(i) = prev_index(self.session.current_index, len, self.session.shuffle, &mut self.rng) {
            self.play_track(i);
        }
    }

    /// Jump to `position`, clamped to `[0, duration]`.
    pub fn seek(&mut self, position: f64) {
        if self.closed || self.loaded.is_none() || position.is_nan() {
            return;
        }
        // An explicit seek supersedes the restored position.
        self.pending_seek = None;
        let target = position.clamp(0.0, self.session.duration.max(0.0));
        self.resource.seek(target);
        self.session.current_time = target;
    }

    /// Move the playhead by `delta` seconds.
    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.session.current_time + delta);
    }

    pub fn set_volume(&mut self, volume: f32) {
        if self.closed || volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.resource.set_volume(volume);
        self.session.volume = volume;
    }

    pub fn toggle_shuffle(&mut self) {
        if !self.closed {
            self.session.shuffle = !self.session.shuffle;
        }
    }

    pub fn toggle_loop(&mut self) {
        if !self.closed {
            self.session.loop_track = !self.session.loop_track;
        }
    }

    /// Play `tracks[index]`. Out-of-range indices are ignored.
    pub fn select_track(&mut self, index: usize) {
        self.play_track(index);
    }

    /// Apply every event the resource has queued. Returns how many were drained.
    pub fn pump(&mut self) -> usize {
        let events = self.resource.poll_events();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    pub fn handle_event(&mut self, event: ResourceEvent) {
        if self.closed {
            return;
        }
        match event {
            ResourceEvent::TimeUpdate { media, position } => {
                if self.is_current(media) && position.is_finite() {
                    self.session.current_time = position.max(0.0);
                }
            }
            ResourceEvent::DurationChange { media, duration } => {
                if self.is_current(media) {
                    self.session.duration = if duration.is_finite() && duration > 0.0 {
                        duration
                    } else {
                        0.0
                    };
                }
            }
            ResourceEvent::CanPlay { media } => {
                if self.is_current(media) {
                    self.apply_pending_seek();
                }
            }
            ResourceEvent::Ended { media } => {
                if self.is_current(media) {
                    self.session.is_playing = false;
                    self.pending_start = None;
                    self.on_ended();
                }
            }
            ResourceEvent::Started { token } => {
                if self.pending_start == Some(token) && token == self.generation {
                    self.pending_start = None;
                    self.session.is_playing = true;
                } else {
                    debug!(token, generation = self.generation, "ignoring stale start");
                }
            }
            ResourceEvent::StartFailed { token, reason } => {
                if self.pending_start == Some(token) {
                    self.pending_start = None;
                    self.session.is_playing = false;
                    let err = PlaybackError::StartFailed(reason);
                    error!(error = %err, "failed to play");
                }
            }
            ResourceEvent::Error { media, reason } => {
                if self.is_current(media) {
                    self.pending_start = None;
                    self.session.is_playing = false;
                    error!(media, reason = %reason, "audio error");
                }
            }
        }
    }

    /// Periodic work: save the session snapshot when it is due.
    pub fn tick(&mut self, now: Instant) {
        if self.closed {
            return;
        }
        let snapshot = self.snapshot();
        self.persister.maybe_save(now, &snapshot);
    }

    /// Save a final snapshot and stop reacting. Every call and event after
    /// this is a no-op; the resource itself is released on drop.
    pub fn shutdown(&mut self, now: Instant) {
        if self.closed {
            return;
        }
        let snapshot = self.snapshot();
        self.persister.save_now(now, &snapshot);
        self.generation += 1;
        self.pending_start = None;
        self.closed = true;
    }

    /// What to persist. A saved position not yet applied is kept as is.
    fn snapshot(&self) -> PersistedSession {
        let current = self.session.persisted();
        match &self.restore {
            Some(saved) => PersistedSession {
                current_index: saved.current_index,
                current_time: saved.current_time,
                ..current
            },
            None => current,
        }
    }

    fn is_current(&self, media: MediaId) -> bool {
        self.loaded.as_ref().is_some_and(|m| m.id == media)
    }

    /// Hand `tracks[index]` to the resource as the new current media, silent,
    /// from position 0.
    fn assign(&mut self, index: usize) {
        let track = &self.tracks[index];
        self.generation += 1;
        self.pending_start = None;
        self.last_media += 1;
        let media = self.last_media;

        debug!(index, media, url = %track.url, "loading track");
        self.resource.load(media, &track.url);
        self.loaded = Some(LoadedMedia {
            id: media,
            path: track.path.clone(),
        });

        self.session.current_index = Some(index);
        self.session.current_time = 0.0;
        self.session.duration = 0.0;
        self.session.is_playing = false;
        self.pending_seek = None;
    }

    fn request_start(&mut self) {
        self.generation += 1;
        let token = self.generation;
        self.pending_start = Some(token);
        self.resource.start(token);
    }

    fn apply_pending_seek(&mut self) {
        let Some(saved) = self.pending_seek.take() else {
            return;
        };
        let target = if self.session.duration > 0.0 {
            saved.min(self.session.duration)
        } else {
            saved
        };
        self.resource.seek(target);
        self.session.current_time = target;
    }

    fn on_ended(&mut self) {
        if self.session.loop_track {
            self.resource.seek(0.0);
            self.session.current_time = 0.0;
            self.request_start();
            return;
        }
        let len = self.tracks.len();
        if let Some(i) = next_index(self.session.current_index, len, self.session.shuffle, &mut self.rng) {
            self.play_track(i);
        }
    }

    fn go_idle(&mut self) {
        self.generation += 1;
        self.pending_start = None;
        self.resource.unload();
        self.loaded = None;
        self.pending_seek = None;
        self.session.current_index = None;
        self.session.is_playing = false;
        self.session.current_time = 0.0;
        self.session.duration = 0.0;
    }
}
