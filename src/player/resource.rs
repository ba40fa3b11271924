//! The seam between the controller and whatever actually produces sound.

/// Identifies one `load` of a media URL. Events for an older load are stale.
pub type MediaId = u64;

/// Asynchronous notification from the playback resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// Playback position advanced (seconds).
    TimeUpdate { media: MediaId, position: f64 },
    /// Media length became known (seconds).
    DurationChange { media: MediaId, duration: f64 },
    /// The media is decoded and can be positioned.
    CanPlay { media: MediaId },
    /// The media played through to its end.
    Ended { media: MediaId },
    /// A `start` request took effect.
    Started { token: u64 },
    /// A `start` request could not take effect.
    StartFailed { token: u64, reason: String },
    /// The media could not be fetched or decoded.
    Error { media: MediaId, reason: String },
}

/// A single audio output the controller owns exclusively.
///
/// Every call returns immediately. `start` is asynchronous: its outcome
/// arrives later as `Started` / `StartFailed` carrying the same token.
pub trait PlaybackResource {
    fn load(&mut self, media: MediaId, url: &str);
    fn unload(&mut self);
    fn start(&mut self, token: u64);
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn set_volume(&mut self, volume: f32);
    /// Drain pending notifications in the order they happened.
    fn poll_events(&mut self) -> Vec<ResourceEvent>;
}
