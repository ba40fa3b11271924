//! Commands for the audio thread and the playhead clock it keeps.

use std::time::{Duration, Instant};

use crate::player::MediaId;

#[derive(Debug)]
pub enum AudioCmd {
    /// Fetch and decode `url`, replacing whatever was loaded. Stays paused.
    Load { media: MediaId, url: String },
    /// Drop the current media.
    Unload,
    /// Start (or resume) the loaded media; answered with `Started`/`StartFailed`.
    Start { token: u64 },
    /// Pause playback.
    Pause,
    /// Move to an absolute position in seconds.
    Seek(f64),
    /// Output volume in `[0, 1]`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Elapsed-time bookkeeping for the sink.
///
/// `rodio` does not tell us where a sink is, so the position is the time
/// accumulated across pauses plus the time since the last resume.
#[derive(Debug, Clone, Default)]
pub struct PlayheadClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlayheadClock {
    pub fn position(&self, now: Instant) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn resume(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    /// Jump to `at`, keeping the running/paused state.
    pub fn reset(&mut self, at: Duration, now: Instant) {
        let running = self.is_running();
        self.accumulated = at;
        self.started_at = running.then_some(now);
    }
}
