mod app;
mod client;
mod config;
mod form;
mod logging;
mod toast;
mod ui;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use app::App;
use client::HttpProblemApi;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration; logging depends on it, so report a bad file afterwards
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    let log_path = logging::init(&config.log)?;
    if let Some(err) = config_error {
        warn!(error = %err, "invalid config file, using defaults");
    }
    info!(base_url = %config.api.base_url, log = ?log_path, "starting problem tracker");

    let api = Arc::new(HttpProblemApi::new(&config.api)?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(config, api);
    app.refresh();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("problem tracker stopped");
    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }

        app.drain_outcomes();
        app.tick(Local::now().date_naive());
    }

    Ok(())
}
