use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioResource;
use crate::catalog::{Deployment, GitHubContents, TrackCatalog};
use crate::player::PlaybackController;

mod event_loop;
mod settings;
mod startup;

use clap::Parser;
use startup::{Cli, Commands};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (settings, config_problem) = settings::load_settings();
    let log_path = startup::init_logging(&settings.logging);
    if let Some(problem) = &config_problem {
        warn!("{problem}");
    }

    let site_url = cli.site_url().unwrap_or(&settings.catalog.site_url);
    let deployment = Deployment::from_site_url(site_url)
        .map_err(|e| format!("invalid site URL {site_url:?}: {e}"))?;
    let storage = startup::open_storage(&settings.storage, &deployment);

    match cli.command {
        Some(Commands::SetSource { owner, repo, .. }) => {
            startup::set_source(storage.as_ref(), &owner, &repo)?;
            println!("clickwheel: {} now plays from {owner}/{repo}", deployment.origin_id());
            return Ok(());
        }
        Some(Commands::ClearSource { .. }) => {
            startup::clear_source(storage.as_ref())?;
            println!("clickwheel: cleared content source for {}", deployment.origin_id());
            return Ok(());
        }
        None => {}
    }

    info!(
        host = %deployment.host,
        path = %deployment.path,
        log = ?log_path,
        "starting clickwheel"
    );

    let source = GitHubContents::new(&settings.catalog)?;
    let mut catalog = TrackCatalog::new(source, storage.clone(), deployment, &settings.catalog);
    let mut controller = PlaybackController::new(
        RodioResource::new(settings.audio.clone()),
        storage,
        &settings.playback,
        Instant::now(),
    );
    let mut app = App::new();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut catalog,
        &mut controller,
    );

    // Stops the audio thread (with its fade-out) before the terminal is restored.
    drop(controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
