//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, PlayerSnapshot};
use crate::config::{ControlsSettings, UiSettings};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[m] menu".to_string(),
        "[j/k] move".to_string(),
        "[enter] select".to_string(),
        "[+/-] volume".to_string(),
        "[s] shuffle".to_string(),
        "[r] loop".to_string(),
        "[R] refresh".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format seconds as `MM:SS`.
pub(crate) fn format_mmss(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / -remaining`, or just elapsed while the length is unknown.
pub(crate) fn time_text(current_time: f64, duration: f64) -> String {
    if duration > 0.0 {
        format!(
            "{} / -{}",
            format_mmss(current_time),
            format_mmss((duration - current_time).max(0.0))
        )
    } else {
        format_mmss(current_time)
    }
}

/// One-line summary of the transport flags.
pub(crate) fn status_text(snapshot: &PlayerSnapshot<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match (snapshot.current_track, snapshot.is_playing) {
        (None, _) => "Stopped",
        (Some(_), true) => "Playing",
        (Some(_), false) => "Paused",
    };
    parts.push(state.to_string());
    parts.push(format!("Shuffle: {}", if snapshot.shuffle { "ON" } else { "OFF" }));
    parts.push(format!("Loop: {}", if snapshot.loop_track { "ON" } else { "OFF" }));
    parts.push(format!("Vol: {:.0}%", snapshot.volume * 100.0));
    if snapshot.loading {
        parts.push("Loading tracks...".to_string());
    } else {
        parts.push(format!("{} tracks", snapshot.tracks.len()));
    }

    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlayerSnapshot<'_>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" clickwheel ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, snapshot, chunks[1]);

    let label = time_text(snapshot.current_time, snapshot.duration);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(snapshot.progress())
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    let status = Paragraph::new(status_text(snapshot))
        .block(Block::bordered().padding(left_pad()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    // The menu overlays the now-playing area.
    if app.menu_open {
        let area = centered_rect_sized(64, chunks[1].height + 2, chunks[1]);
        draw_menu(frame, app, snapshot, area);
    }
}

fn draw_now_playing(frame: &mut Frame, snapshot: &PlayerSnapshot<'_>, area: Rect) {
    let mut lines: Vec<String> = Vec::new();
    match snapshot.current_track {
        Some(track) => {
            lines.push(track.title.clone());
            lines.push(track.artist.clone());
            if track.album_art.is_some() {
                lines.push("[cover art]".to_string());
            }
        }
        None if snapshot.loading => lines.push("Loading tracks...".to_string()),
        None if snapshot.tracks.is_empty() => lines.push("No tracks".to_string()),
        None => lines.push("Press [space] to play".to_string()),
    }
    if let Some(err) = &snapshot.error {
        lines.push(String::new());
        lines.push(err.clone());
    }

    let body = Paragraph::new(lines.join("\n"))
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn draw_menu(frame: &mut Frame, app: &App, snapshot: &PlayerSnapshot<'_>, area: Rect) {
    frame.render_widget(Clear, area);

    // Only build ListItems for the visible window around the cursor.
    let total = snapshot.tracks.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let cursor = app.menu_cursor.min(total.saturating_sub(1));
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = cursor.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let items: Vec<ListItem> = snapshot.tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let marker = if Some(start + offset) == snapshot.current_index {
                "▶ "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{} - {}", track.artist, track.title))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" music "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ")
        .bold();
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(cursor - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
