//! Wisdom TUI Entry Point
//!
//! Launches the terminal UI for Wisdom Through Time.
//!
//! # Usage
//!
//! ```bash
//! # Endpoint from the environment
//! WISDOM_API_URL=https://example.com/api/chat wisdom-tui
//!
//! # Endpoint and catalog on the command line
//! wisdom-tui --api-url http://localhost:8080/chat --catalog figures.toml
//!
//! # Debug logging (written to a file, the terminal belongs to the UI)
//! RUST_LOG=wisdom_conductor=debug wisdom-tui --log-file /tmp/wisdom.log
//! ```

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wisdom_conductor::{
    default_config_path, load_config_with, ConfigOverrides, HttpExchangeClient, ViewStateMachine,
};
use wisdom_tui::app::CrosstermTerminal;
use wisdom_tui::App;

/// Wisdom Through Time - conversations with historical figures
#[derive(Parser, Debug)]
#[command(name = "wisdom-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Exchange endpoint URL (overrides WISDOM_API_URL and the config file)
    #[arg(short = 'u', long, value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "WISDOM_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalog file replacing the built-in figures
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Log file, used when RUST_LOG is set
    #[arg(long, env = "WISDOM_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: wisdom-tui requires a terminal (TTY)");
        std::process::exit(1);
    }

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.api_url.clone() {
        overrides = overrides.with_api_url(url);
    }
    if let Some(path) = args.catalog.clone() {
        overrides = overrides.with_catalog_path(path);
    }

    let config = load_config_with(args.config.clone().or_else(default_config_path), &overrides)
        .context("Failed to load configuration")?;
    let catalog = config.load_catalog()?;
    let client = HttpExchangeClient::from_config(&config)
        .context("Failed to build exchange client")?;

    tracing::info!(
        endpoint = %config.endpoint,
        source = %config.source(),
        figures = catalog.len(),
        "Starting wisdom-tui"
    );

    let view = ViewStateMachine::new(catalog, Arc::new(client));

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, view).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

async fn run_app(terminal: &mut CrosstermTerminal, view: ViewStateMachine) -> Result<()> {
    let mut app = App::new(view);
    app.run(terminal).await
}

/// Log to a file when `RUST_LOG` is set; stay silent otherwise
fn init_logging(args: &Args) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("wisdom-tui.log"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Ok(())
}
