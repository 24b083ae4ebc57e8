use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use cube4::config::AppConfig;
use cube4::engine::EngineWorker;
use cube4::game::GameMode;
use cube4::ui::App;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Human vs Human
    Hvh,
    /// Human (Red) vs Engine
    Hve,
    /// Engine vs Engine
    Eve,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hvh => GameMode::HumanVsHuman,
            ModeArg::Hve => GameMode::HumanVsEngine,
            ModeArg::Eve => GameMode::EngineVsEngine,
        }
    }
}

/// Play 4x4x4 connect four in the terminal against an external engine.
#[derive(Parser)]
#[command(name = "cube4", about = "3D connect four in the terminal")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "cube4.toml")]
    config: PathBuf,

    /// Override the engine executable
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Start straight into a mode instead of showing the menu
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_file = File::create(&config.log.file)
        .with_context(|| format!("creating log file {}", config.log.file.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml()?);
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(engine) = cli.engine {
        config.engine.path = engine;
    }

    init_logging(&config)?;
    info!(config = %cli.config.display(), engine = %config.engine.path.display(), "starting cube4");

    // The engine must be up before the terminal is taken over.
    let worker = EngineWorker::launch(&config.engine).context("starting the engine")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, worker, cli.mode.map(GameMode::from));
    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    // Dropping the app shuts the engine down.
    drop(app);
    info!("exited");
    res.map_err(Into::into)
}
