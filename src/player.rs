//! Transport control over a single playback resource.

mod controller;
mod navigation;
mod resource;
mod session;

pub use controller::PlaybackController;
pub use navigation::{next_index, prev_index};
pub use resource::{MediaId, PlaybackResource, ResourceEvent};
pub use session::{PersistedSession, PlayerSession, SessionPersister, load_session, save_session};

#[cfg(test)]
mod tests;
