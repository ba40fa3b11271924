use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::Intent;

/// Map a key press to an intent. Unbound keys give `None`.
pub fn intent_for_key(key: &KeyEvent) -> Option<Intent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Intent::Quit),
            _ => None,
        };
    }

    let intent = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Intent::TogglePlay,
        KeyCode::Char('l') | KeyCode::Right => Intent::Next,
        KeyCode::Char('h') | KeyCode::Left => Intent::Previous,
        KeyCode::Char('m') => Intent::Menu,
        KeyCode::Enter => Intent::Select,
        KeyCode::Char('k') | KeyCode::Up => Intent::MenuUp,
        KeyCode::Char('j') | KeyCode::Down => Intent::MenuDown,
        KeyCode::Char('+') | KeyCode::Char('=') => Intent::VolumeUp,
        KeyCode::Char('-') => Intent::VolumeDown,
        KeyCode::Char('s') => Intent::ToggleShuffle,
        KeyCode::Char('r') => Intent::ToggleLoop,
        KeyCode::Char('R') => Intent::Refresh,
        KeyCode::Char('L') => Intent::ScrubForward,
        KeyCode::Char('H') => Intent::ScrubBack,
        KeyCode::Char('q') => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}
