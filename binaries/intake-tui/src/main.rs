//! Intake wizard terminal UI
//!
//! Asks one question at a time and posts the collected answers as JSON to a
//! workflow webhook.

mod app;
mod events;
mod layout;
mod theme;
mod ui;
mod worker;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use events::EventHandler;
use intake_config::IntakeConfig;
use intake_submit::{AttachmentResolver, DryRunSubmitter, HttpSubmitter, LocalFileResolver, Submitter};
use intake_wizard::Terminal as Outcome;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use worker::SubmissionWorker;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "One-question-at-a-time intake form for the terminal")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to <config dir>/intake/config.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Webhook that receives the answers
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Log the payload instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Where to write logs; the terminal itself is taken by the UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_file)?;

    let mut config = IntakeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(endpoint) = &args.endpoint {
        config = config
            .with_endpoint(endpoint)
            .context("Invalid --endpoint")?;
    }
    tracing::info!(
        endpoint = %config.endpoint,
        steps = config.total_steps(),
        dry_run = args.dry_run,
        "starting intake"
    );

    let submitter: Arc<dyn Submitter> = if args.dry_run {
        Arc::new(DryRunSubmitter)
    } else {
        Arc::new(HttpSubmitter::from_config(&config).context("Failed to build HTTP client")?)
    };
    let resolver: Arc<dyn AttachmentResolver> = Arc::new(LocalFileResolver);
    let worker = SubmissionWorker::spawn(submitter, resolver);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, worker, args.dry_run);
    let size = terminal.size()?;
    app.handle_resize(size.width, size.height);
    let event_handler = EventHandler::new(config.tick_rate);

    let result = run_app(&mut terminal, &mut app, event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Application error: {}", e);
    } else if app.wizard.terminal() == Outcome::Success {
        println!("Thanks, your answers were sent.");
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut event_handler: EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match event_handler.next().await? {
            events::Event::Tick => app.on_tick(),
            events::Event::Key(key) => {
                if app.handle_key(key) {
                    tracing::info!(step = app.wizard.active_step(), "quit requested");
                    return Ok(());
                }
            }
            events::Event::Mouse(mouse) => app.handle_mouse(mouse),
            events::Event::Paste(text) => app.handle_paste(text),
            events::Event::Resize(width, height) => app.handle_resize(width, height),
        }
    }
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("intake")
        .join("intake.log")
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}
