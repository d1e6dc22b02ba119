use blind_timer::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{ConfigOverrides, ConfigStore, FileConfigStore},
    hiscores::HighScores,
    runtime::{CrosstermEventSource, GameEvent, Runner},
    scoring::format_score,
    state::GameState,
    storage::{KeyValueStore, MemoryStore, SqliteStore},
    timer::MonotonicClock,
    ui,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{File, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

/// blind reaction-timing game: stop the clock as close to the target as you dare
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Each round shows a target time. Start the clock, then stop it when you think that much time has passed. You never see the clock tick. Stopping early costs points; stopping late scores nothing."
)]
pub struct Cli {
    /// number of rounds per game
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// shortest target time in seconds
    #[clap(long, allow_negative_numbers = true)]
    min_target: Option<f64>,

    /// longest target time in seconds
    #[clap(long, allow_negative_numbers = true)]
    max_target: Option<f64>,

    /// decimal places shown on target times
    #[clap(short = 'p', long, allow_negative_numbers = true)]
    precision: Option<i32>,

    /// points for a perfect round
    #[clap(long, allow_negative_numbers = true)]
    max_points: Option<f64>,

    /// how sharply early stops are penalised (2 = quadratic)
    #[clap(long, allow_negative_numbers = true)]
    exponent: Option<f64>,

    /// seed for reproducible target times
    #[clap(long)]
    seed: Option<u64>,

    /// config file to read (and write with --save-config)
    #[clap(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// high-score database file
    #[clap(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// print the high-score list and exit
    #[clap(long)]
    show_scores: bool,

    /// erase the high-score list and exit
    #[clap(long)]
    clear_scores: bool,

    /// write the high-score list as CSV and exit
    #[clap(long, value_name = "PATH")]
    export_scores: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            total_rounds: self.rounds,
            min_target_time: self.min_target,
            max_target_time: self.max_target,
            target_precision: self.precision,
            max_points_per_round: self.max_points,
            scoring_exponent: self.exponent,
        }
    }

    fn config_store(&self) -> FileConfigStore {
        self.config
            .as_ref()
            .map(FileConfigStore::with_path)
            .unwrap_or_default()
    }

    fn is_score_command(&self) -> bool {
        self.show_scores || self.clear_scores || self.export_scores.is_some()
    }
}

/// Initialize logging into a file; the terminal belongs to the game.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    let path = std::env::var_os("BLIND_TIMER_LOG")
        .map(PathBuf::from)
        .or_else(AppDirs::log_path);

    if let Some(path) = path {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::sink)
        .init();
}

fn open_storage(path: Option<&Path>) -> Box<dyn KeyValueStore> {
    let opened = match path {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::new(),
    };

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("high scores unavailable, keeping them in memory: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

fn run_score_commands<S: KeyValueStore>(
    cli: &Cli,
    scores: &HighScores<S>,
) -> Result<(), Box<dyn Error>> {
    if cli.show_scores {
        let entries = scores.load();
        if entries.is_empty() {
            println!("No scores yet!");
        }
        for (idx, entry) in entries.iter().enumerate() {
            println!(
                "{:>2}. {:<10} {:>9}  {} rds  {}",
                idx + 1,
                entry.name,
                format_score(entry.score),
                entry.rounds,
                entry.formatted_date()
            );
        }
    }

    if let Some(path) = &cli.export_scores {
        scores.export_csv(File::create(path)?)?;
        println!("exported high scores to {}", path.display());
    }

    if cli.clear_scores {
        if !scores.clear() {
            return Err("could not clear high scores".into());
        }
        println!("high scores cleared");
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = cli.config_store();
    let config = cli.overrides().apply_to(&config_store.load());

    let validation = config.validate();
    if !validation.valid {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::ValueValidation,
            format!(
                "invalid configuration:\n  {}",
                validation.errors.join("\n  ")
            ),
        )
        .exit();
    }

    if cli.save_config {
        config_store.save(&config)?;
        tracing::info!(path = %config_store.path().display(), "config saved");
    }

    let storage = open_storage(cli.db.as_deref());

    if cli.is_score_command() {
        return run_score_commands(&cli, &HighScores::new(storage));
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let rng = cli
        .seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    let mut app = App::new(config, MonotonicClock, storage, rng);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_game(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_game<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<MonotonicClock, S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::with_default_tick(CrosstermEventSource::new());
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                app.on_tick();
                // only the running screen animates
                if app.state() != GameState::TimerRunning {
                    continue;
                }
            }
            GameEvent::Resize(_, _) => {}
            GameEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
            }
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
