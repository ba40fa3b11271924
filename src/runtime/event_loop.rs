use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{App, AppAction, PlayerSnapshot, intent_for_key};
use crate::catalog::{ContentSource, TrackCatalog};
use crate::config;
use crate::player::{PlaybackController, PlaybackResource};
use crate::ui;

type Term = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Main terminal event loop: loads the catalog, then handles input, drains
/// resource events, persists the session and redraws. Returns `Ok(())` when
/// shutdown is requested.
pub fn run<S: ContentSource, R: PlaybackResource>(
    terminal: &mut Term,
    settings: &config::Settings,
    app: &mut App,
    catalog: &mut TrackCatalog<S>,
    controller: &mut PlaybackController<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    load_catalog(terminal, settings, app, catalog, controller, false)?;

    loop {
        controller.pump();
        controller.tick(Instant::now());
        app.clamp_cursor(controller.tracks().len());

        draw(terminal, settings, app, catalog, controller)?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(intent) = intent_for_key(&key) else {
            continue;
        };

        match app.handle(intent, controller, &settings.controls) {
            AppAction::None => {}
            AppAction::Refresh => {
                info!("refreshing catalog");
                load_catalog(terminal, settings, app, catalog, controller, true)?;
            }
            AppAction::Quit => break,
        }
    }

    controller.shutdown(Instant::now());
    Ok(())
}

/// Load the catalog and hand the result to the controller.
///
/// The request blocks, so the loading state is drawn first.
fn load_catalog<S: ContentSource, R: PlaybackResource>(
    terminal: &mut Term,
    settings: &config::Settings,
    app: &App,
    catalog: &mut TrackCatalog<S>,
    controller: &mut PlaybackController<R>,
    force_refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    catalog.mark_loading();
    draw(terminal, settings, app, catalog, controller)?;

    let tracks = if force_refresh {
        catalog.refresh().to_vec()
    } else {
        catalog.load(false).to_vec()
    };
    controller.set_tracks(tracks);
    Ok(())
}

fn draw<S: ContentSource, R: PlaybackResource>(
    terminal: &mut Term,
    settings: &config::Settings,
    app: &App,
    catalog: &TrackCatalog<S>,
    controller: &PlaybackController<R>,
) -> std::io::Result<()> {
    let snapshot = PlayerSnapshot::new(
        controller.session(),
        controller.tracks(),
        catalog.is_loading(),
        catalog.error_message(),
    );
    terminal.draw(|f| ui::draw(f, app, &snapshot, &settings.ui, &settings.controls))?;
    Ok(())
}
