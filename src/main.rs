use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use keystrike::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    game::{RandomTargets, WrongKeyPolicy},
    levels::LevelConfig,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    scores::{Leaderboard, ScoreStore, SqliteScoreStore},
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
};

/// timed single-key typing drills with a shared high-score table
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Press the key shown on screen as often as you can in 60 seconds. Each level has its own key set and scoring; finished rounds can be saved to a high-score table shared by everyone using the same database file."
)]
pub struct Cli {
    /// level to start on
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=3))]
    level: Option<u8>,

    /// what happens to the target after a wrong key
    #[clap(long, value_enum)]
    on_miss: Option<WrongKeyPolicy>,

    /// score database to read and write (share it to share the leaderboard)
    #[clap(long)]
    db: Option<PathBuf>,

    /// number of high scores to show
    #[clap(short = 'n', long)]
    top: Option<usize>,
}

impl Cli {
    /// Command line flags win over the saved config
    fn apply_to(&self, mut cfg: Config) -> Config {
        if let Some(level) = self.level {
            cfg.level = level;
        }
        if let Some(policy) = self.on_miss {
            cfg.wrong_key_policy = policy;
        }
        if let Some(db) = &self.db {
            cfg.db_path = Some(db.clone());
        }
        if let Some(top) = self.top {
            cfg.leaderboard_size = top;
        }
        cfg
    }
}

/// The TUI owns the terminal, so log lines go to a file in the state dir
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config_store = FileConfigStore::new();
    let mut config = cli.apply_to(config_store.load());
    let db_path = config.resolved_db_path();
    info!("using score database {}", db_path.display());

    let store: Box<dyn ScoreStore> = Box::new(SqliteScoreStore::open(&db_path)?);
    let level = LevelConfig::by_id(config.level).unwrap_or_else(LevelConfig::first);
    let mut app = App::new(
        Leaderboard::new(store, config.leaderboard_size),
        level,
        config.wrong_key_policy,
        Box::new(RandomTargets),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // release events are how we learn that shift is held
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    config.level = app.selected_level.id;
    if let Err(e) = config_store.save(&config) {
        warn!("could not save config to {}: {e}", config_store.path().display());
    }

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::seconds());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => {
                app.on_tick();
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => match app.on_key(key) {
                Control::Quit => break,
                Control::GameStarted => runner.reset_ticks(),
                Control::Continue => {}
            },
        }
    }

    Ok(())
}
