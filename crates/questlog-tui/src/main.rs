//! questlog - a keyboard-driven terminal client for a gamified productivity tracker.
//!
//! Post quests, time them, turn them in for XP, and track goals and badges
//! against a questlog server.

mod app;
mod form;
mod ui;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use questlog_core::auth::{AuthMode, Credentials};
use questlog_core::config::Config;

use app::{build_api_client, App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the log directory
const LOG_FILE_NAME: &str = "questlog.log";

const USAGE: &str = "\
Usage: questlog [COMMAND]

Commands:
  (none)     Start the terminal interface
  login      Log in from the command line and store the credential
  register   Create an account and store the credential
  logout     Forget the stored credential
  -h, --help Show this message

Environment:
  QUESTLOG_API_URL   Server base URL (default http://localhost:8080/api)
  QUESTLOG_USERNAME  Username to prefill
  RUST_LOG           Log filter (default warn)";

/// Where log output goes
enum LogTarget {
    /// Daily-rolling file; the terminal belongs to the UI.
    File,
    Stderr,
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug).
/// The returned guard flushes the file writer when dropped.
fn init_tracing(target: LogTarget) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match target {
        LogTarget::File => Config::log_dir()
            .and_then(|dir| {
                std::fs::create_dir_all(&dir)?;
                Ok(dir)
            })
            .ok(),
        LogTarget::Stderr => None,
    };

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn load_config() -> Config {
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None => {}
        Some("login") => return cli_authenticate(AuthMode::Login).await,
        Some("register") => return cli_authenticate(AuthMode::Register).await,
        Some("logout") => return cli_logout(),
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    let _log_guard = init_tracing(LogTarget::File);
    info!("questlog starting");

    let config = load_config();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new(config) {
        Ok(mut app) => {
            if app.is_authenticated() {
                app.start_session();
            } else {
                app.start_login();
            }
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
    }

    info!("questlog shutting down");
    Ok(())
}

/// Prompt for a line on stdin, falling back to `default` when left empty
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim();
    if value.is_empty() {
        return Ok(default.unwrap_or_default().to_string());
    }
    Ok(value.to_string())
}

async fn cli_authenticate(mode: AuthMode) -> Result<()> {
    let _ = init_tracing(LogTarget::Stderr);
    let mut config = load_config();

    let username = prompt("Username", config.last_username.as_deref())?;
    if username.is_empty() {
        bail!("Username is required");
    }
    if username.contains(':') {
        bail!("Username may not contain ':'");
    }
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let api = build_api_client(&config)?;
    api.authenticate(&Credentials::new(username.clone(), password), mode)
        .await
        .with_context(|| format!("{} failed", mode.title()))?;

    config.last_username = Some(username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
    eprintln!("Logged in as {}", username);
    Ok(())
}

fn cli_logout() -> Result<()> {
    let _ = init_tracing(LogTarget::Stderr);
    let config = load_config();
    build_api_client(&config)?.logout();
    eprintln!("Logged out");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout so ticks and task results still land
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
