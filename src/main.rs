use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vitalwatch::app::{App, MAX_INTERVAL, MIN_INTERVAL};
use vitalwatch::data::export;
use vitalwatch::{events, ui, MonitoringSession, Settings};

#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(about = "Simulated bedside monitor for a single patient's vital signs")]
#[command(group(ArgGroup::new("output").args(["export", "csv"]).multiple(true)))]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Readings kept per channel (10-100)
    #[arg(short, long)]
    window: Option<usize>,

    /// Time between ticks (e.g., "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Probability per tick that an anomaly episode starts on a channel
    #[arg(long)]
    anomaly_rate: Option<f64>,

    /// Run this many ticks without the dashboard, then exit
    #[arg(long, requires = "output")]
    ticks: Option<u64>,

    /// Write the final window to a JSON file (headless mode)
    #[arg(short, long, requires = "ticks")]
    export: Option<PathBuf>,

    /// Write the final window to a CSV file (headless mode)
    #[arg(long, requires = "ticks")]
    csv: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Layer command-line flags over loaded settings.
    fn apply(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(window) = self.window {
            settings.window = window;
        }
        if let Some(ref interval) = self.interval {
            settings.interval = interval.clone();
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if let Some(rate) = self.anomaly_rate {
            settings.anomaly_rate = rate;
        }
        if self.log_file.is_some() {
            settings.log_file = self.log_file.clone();
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = args.apply(Settings::load(args.config.as_deref())?)?;
    let headless = args.ticks.is_some();

    init_tracing(settings.log_file.as_deref(), headless)?;

    let session = MonitoringSession::clinical(
        settings.generator_config(),
        settings.seed,
        settings.window,
    )?;

    if let Some(ticks) = args.ticks {
        return run_headless(session, ticks, args.export.as_deref(), args.csv.as_deref());
    }

    let interval = settings.tick_interval()?.clamp(MIN_INTERVAL, MAX_INTERVAL);
    run_tui(session, interval)
}

/// Install the tracing subscriber.
///
/// The dashboard owns the terminal, so it only logs when a file is given.
fn init_tracing(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if headless => {
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
        }
        None => {}
    }
    Ok(())
}

/// Run a fixed number of ticks and write the requested exports
fn run_headless(
    mut session: MonitoringSession,
    ticks: u64,
    json_path: Option<&Path>,
    csv_path: Option<&Path>,
) -> Result<()> {
    for _ in 0..ticks {
        session.tick()?;
    }
    info!(ticks, overall = %session.overall_severity(), "headless run complete");

    if let Some(path) = json_path {
        export::write_json(&session, path)?;
        println!("Exported JSON to: {}", path.display());
    }
    if let Some(path) = csv_path {
        export::write_csv(&session, path)?;
        println!("Exported CSV to: {}", path.display());
    }
    Ok(())
}

/// Run the dashboard until the user quits
fn run_tui(session: MonitoringSession, interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(session, interval, ui::Theme::auto_detect());
    info!(interval = ?interval, window = app.session.window(), "dashboard started");

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        if app.tick_due() {
            app.advance();
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    info!(ticks = app.session.ticks(), "dashboard closed");
    Ok(())
}
