//! learnops-tui: Terminal client for the learnops tutoring platform
//!
//! - Sign in / sign up with inline validation
//! - Session catalog and one-key session launch
//! - Room view with tutor chat, media toggles and a whiteboard
//! - Connectivity diagnostics against the backend

mod app;
mod input;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::{App, AppResult};
use crate::input::handle_key;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to file (not stdout, would interfere with TUI)
    let log_dir = dirs::cache_dir()
        .map(|d| d.join("learnops"))
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "tui.log");
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnops_tui=debug,learnops_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    // Load config
    let config = learnops_core::Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        learnops_core::Config::default().with_env_overrides()
    });
    tracing::info!("Backend: {}", config.api.base_url);
    let mouse = config.client.tui.mouse;

    // Create app and restore any saved session before the first frame
    let mut app = App::new(config);
    app.initialize().await;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Main application loop
async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with timeout (allows background tasks to report back)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C quits from any mode
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle key input
                match handle_key(app, key) {
                    AppResult::Continue => {}
                    AppResult::Quit => return Ok(()),
                }
            }
        }

        // Drain finished background work, deliver chat replies
        app.tick().await;
    }
}
