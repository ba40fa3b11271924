//! Presentation model: what the screen shows and what the user asked for.
//!
//! `App` only owns view state (is the menu open, where is its cursor).
//! Transport state lives in the controller and is read through
//! `PlayerSnapshot` each frame.

use crate::catalog::Track;
use crate::config::ControlsSettings;
use crate::player::{PlaybackController, PlaybackResource, PlayerSession};

/// Something the user asked for, independent of how they asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    TogglePlay,
    Next,
    Previous,
    /// Open or close the track menu.
    Menu,
    /// The center button: play the highlighted track in the menu, otherwise
    /// play/pause.
    Select,
    MenuUp,
    MenuDown,
    VolumeUp,
    VolumeDown,
    SetVolume(f32),
    ToggleShuffle,
    ToggleLoop,
    Refresh,
    SelectTrack(usize),
    ScrubForward,
    ScrubBack,
    Quit,
}

/// What the runtime still has to do after an intent was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    /// Reload the catalog, bypassing the cache.
    Refresh,
    Quit,
}

/// Read-only view of everything the screen renders.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot<'a> {
    pub tracks: &'a [Track],
    pub current_index: Option<usize>,
    pub current_track: Option<&'a Track>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f32,
    pub shuffle: bool,
    pub loop_track: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl<'a> PlayerSnapshot<'a> {
    pub fn new(
        session: &PlayerSession,
        tracks: &'a [Track],
        loading: bool,
        error: Option<String>,
    ) -> Self {
        let current_track = session.current_index.and_then(|i| tracks.get(i));
        Self {
            tracks,
            current_index: session.current_index,
            current_track,
            is_playing: session.is_playing,
            current_time: session.current_time,
            duration: session.duration,
            volume: session.volume,
            shuffle: session.shuffle,
            loop_track: session.loop_track,
            loading,
            error,
        }
    }

    /// Fraction of the track already played, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default)]
pub struct App {
    pub menu_open: bool,
    pub menu_cursor: usize,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `intent` to the view state and, through `controller`, to the transport.
    pub fn handle<R: PlaybackResource>(
        &mut self,
        intent: Intent,
        controller: &mut PlaybackController<R>,
        controls: &ControlsSettings,
    ) -> AppAction {
        match intent {
            Intent::TogglePlay => controller.toggle_play(),
            Intent::Next => controller.next_track(),
            Intent::Previous => controller.prev_track(),
            Intent::Menu => self.toggle_menu(controller.session().current_index, controller.tracks().len()),
            Intent::Select => {
                if self.menu_open && !controller.tracks().is_empty() {
                    controller.select_track(self.menu_cursor);
                    self.menu_open = false;
                } else {
                    controller.toggle_play();
                }
            }
            Intent::MenuUp => self.move_cursor(-1, controller.tracks().len()),
            Intent::MenuDown => self.move_cursor(1, controller.tracks().len()),
            Intent::VolumeUp => {
                let v = controller.session().volume + controls.volume_step;
                controller.set_volume(v);
            }
            Intent::VolumeDown => {
                let v = controller.session().volume - controls.volume_step;
                controller.set_volume(v);
            }
            Intent::SetVolume(v) => controller.set_volume(v),
            Intent::ToggleShuffle => controller.toggle_shuffle(),
            Intent::ToggleLoop => controller.toggle_loop(),
            Intent::SelectTrack(i) => controller.select_track(i),
            Intent::ScrubForward => controller.seek_by(controls.scrub_seconds as f64),
            Intent::ScrubBack => controller.seek_by(-(controls.scrub_seconds as f64)),
            Intent::Refresh => return AppAction::Refresh,
            Intent::Quit => return AppAction::Quit,
        }
        AppAction::None
    }

    /// Open the menu on the current track, or close it.
    pub fn toggle_menu(&mut self, current: Option<usize>, len: usize) {
        self.menu_open = !self.menu_open;
        if self.menu_open {
            self.menu_cursor = current.filter(|&i| i < len).unwrap_or(0);
        }
    }

    /// Keep the cursor inside a list of `len` tracks.
    pub fn clamp_cursor(&mut self, len: usize) {
        self.menu_cursor = self.menu_cursor.min(len.saturating_sub(1));
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if !self.menu_open || len == 0 {
            return;
        }
        self.menu_cursor = self.menu_cursor.saturating_add_signed(delta).min(len - 1);
    }
}
