use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde_json::Value;
use tracing::{debug, info};

use nebula_live::data::duration::parse_duration;
use nebula_live::logging::{self, LogFormat};
use nebula_live::preview::{clamp_node_refresh, execution_message, ConfigDelta, NodeInputs};
use nebula_live::{
    events, ui, App, Command, HostUpdate, HttpSource, PreviewController, PreviewDriver,
    PreviewHandle, PreviewView, Settings, SystemOpener,
};

#[derive(Parser, Debug)]
#[command(name = "nebula-live")]
#[command(about = "Live preview monitor for Nebula render projects")]
struct Args {
    /// Base URL of the Nebula routes
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Project to follow
    #[arg(short, long, conflicts_with_all = ["message", "project_data"])]
    project: Option<String>,

    /// Poll period (e.g., "750ms", "1s"; a bare number is milliseconds)
    #[arg(short, long)]
    refresh: Option<String>,

    /// Include images in loop subfolders
    #[arg(long, action = ArgAction::Set)]
    include_subdirs: Option<bool>,

    /// Request timeout (e.g., "10s")
    #[arg(long)]
    timeout: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deliver a host execution-result JSON file
    #[arg(short, long, conflicts_with = "project_data")]
    message: Option<PathBuf>,

    /// Build the execution result from a project_data JSON file
    #[arg(long)]
    project_data: Option<PathBuf>,

    /// Directory holding one folder per project
    #[arg(long)]
    nebula_root: Option<PathBuf>,

    /// Log view changes instead of drawing the terminal UI
    #[arg(long)]
    headless: bool,

    /// Log file used while the terminal UI is shown
    #[arg(long, default_value = "nebula-live.log")]
    log_file: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    if args.headless {
        logging::init_stderr(format)?;
    } else {
        logging::init_file(&args.log_file, format)?;
    }

    let settings = resolve_settings(&args)?;
    let message = initial_message(&args, &settings)?;

    let source = HttpSource::builder()
        .endpoint(settings.endpoint.clone())
        .timeout(settings.request_timeout())
        .build()?;
    info!(endpoint = %settings.endpoint, "starting preview");

    // Build a tokio runtime; the driver keeps running on its workers while
    // the terminal UI owns the main thread.
    let rt = tokio::runtime::Runtime::new()?;

    let (handle, task) = rt.block_on(async {
        PreviewDriver::new(PreviewController::new(Box::new(source)))
            .on_teardown(|| debug!("preview torn down"))
            .spawn()
    });

    if let Some(message) = message {
        handle.try_send(Command::Execution(message))?;
    }

    let result = if args.headless {
        rt.block_on(run_headless(&handle))
    } else {
        run_tui(handle.clone())
    };

    // Signal shutdown
    rt.block_on(async {
        let _ = handle.shutdown().await;
        let _ = task.await;
    });

    result
}

/// Apply command-line overrides on top of the layered settings.
fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref endpoint) = args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(ref project) = args.project {
        settings.project_id = Some(project.clone());
    }
    if let Some(ref refresh) = args.refresh {
        settings.refresh_ms = parse_duration(refresh)?.as_millis() as u64;
    }
    if let Some(include) = args.include_subdirs {
        settings.include_subdirs = include;
    }
    if let Some(ref timeout) = args.timeout {
        settings.request_timeout_ms = parse_duration(timeout)?.as_millis() as u64;
    }
    if args.nebula_root.is_some() {
        settings.nebula_root = args.nebula_root.clone();
    }

    Ok(settings)
}

/// The first host message: a file, a message built from project data, or
/// one synthesised from the settings.
fn initial_message(args: &Args, settings: &Settings) -> Result<Option<Value>> {
    if let Some(ref path) = args.message {
        return read_json(path).map(Some);
    }

    if let Some(ref path) = args.project_data {
        let project_data = read_json(path)?;
        let inputs = NodeInputs {
            refresh_ms: settings.refresh_ms,
            include_subdirs: settings.include_subdirs,
            nebula_root: settings.nebula_root.as_deref(),
        };
        return Ok(Some(execution_message(&project_data, &inputs)));
    }

    Ok(settings_message(settings))
}

/// Settings go through the same refresh bounds as the producing node.
fn settings_message(settings: &Settings) -> Option<Value> {
    let project_id = settings.project_id.as_ref()?;
    let update = HostUpdate {
        error: None,
        delta: ConfigDelta {
            target_id: Some(project_id.clone()),
            refresh_interval_ms: Some(clamp_node_refresh(settings.refresh_ms)),
            include_subdirectories: Some(settings.include_subdirs),
            target_exists: settings
                .nebula_root
                .as_deref()
                .map(|root| root.join(project_id).is_dir()),
        },
    };
    Some(update.to_message())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Log every published view until Ctrl-C or the driver stops.
async fn run_headless(handle: &PreviewHandle) -> Result<()> {
    let mut updates = handle.subscribe();
    log_view(&updates.borrow_and_update());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                log_view(&updates.borrow_and_update());
            }
        }
    }

    Ok(())
}

fn log_view(view: &PreviewView) {
    info!(
        project = view.target_id.as_deref().unwrap_or("-"),
        state = view.state.label(),
        revision = view.display.image_revision,
        image = view.display.image_url.as_deref().unwrap_or("-"),
        status = %view.display.status_text,
        "preview"
    );
}

/// Run the TUI until the user quits.
fn run_tui(handle: PreviewHandle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(handle, Box::new(SystemOpener));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_view();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
