use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ratatui::crossterm::event;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use osintdash_core::{EffectContext, PageLayout};

mod action;
mod app;
mod backend;
mod config;
mod input;
mod theme;
mod tui_event;
mod view;

use app::App;
use config::{CliOverrides, FileConfig};

/// osintdash: investigation dashboards in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Page layout file (TOML)
    layout: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// How long notifications stay on screen, in milliseconds (0 keeps them)
    #[arg(long)]
    notification_ms: Option<u64>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file (default: <config dir>/osintdash/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Send tracing output, and `log` records from the core crate, to a file so
/// the terminal stays with the UI.
fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("OSINTDASH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Resolve config from CLI flags > env vars > config file > defaults
    let file_config = match args.config.clone().or_else(config::default_config_path) {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    let cli = CliOverrides {
        layout: args.layout,
        export_dir: args.export_dir,
        notification_ms: args.notification_ms,
        log_file: args.log_file,
    };
    let settings = config::resolve(cli, |key| std::env::var(key).ok(), file_config)?;

    init_logging(&settings.log_file)?;

    if !settings.layout.exists() {
        anyhow::bail!("Layout file not found: {}", settings.layout.display());
    }
    let dashboard = PageLayout::load(&settings.layout)?.build(settings.notification_duration)?;
    tracing::info!(
        "loaded {} ({} tables), exporting to {}",
        settings.layout.display(),
        dashboard.tables().len(),
        settings.export_dir.display()
    );

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(dashboard);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let effect_ctx = EffectContext {
        clipboard: Arc::new(backend::SystemClipboard::new()),
        export_dir: settings.export_dir.clone(),
    };

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    // Main event loop
    let tick_rate = settings.tick_rate;

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            // Effect completions (non-blocking drain)
            maybe_event = rx.recv() => {
                if let Some(task_event) = maybe_event {
                    app.handle_task_event(task_event);
                    while let Ok(evt) = rx.try_recv() {
                        app.handle_task_event(evt);
                    }
                }
            }
            // Terminal input events
            _ = async {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let action = if app.is_editing() {
                            input::map_edit_event(&evt)
                        } else {
                            input::map_event(&evt)
                        };
                        app.update(action);
                    }
                }
            } => {}
        }

        app.update(action::Action::Tick);

        for effect in app.take_background_effects() {
            backend::spawn_effect(effect, effect_ctx.clone(), tx.clone(), cancel.clone());
        }

        if app.should_quit || cancel.is_cancelled() {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("exiting with {} diagnostics", app.dashboard.diagnostic_count());
    Ok(())
}
