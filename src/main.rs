mod app;
mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
};

use typerate::{
    app_dirs::AppDirs,
    clock::SessionClock,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    passages::{Category, Difficulty},
    recorder::{export_history_csv, RecordStore, ResultRecorder, SqliteRecordStore},
    runtime::{CrosstermEventSource, FixedTicker, Runner, TypingEventSource},
};

use crate::app::App;

/// terminal typing test with live wpm, accuracy and consistency
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing test that tracks speed, accuracy and consistency while you type, and remembers your personal best and recent results."
)]
pub struct Cli {
    /// passage category
    #[clap(short = 'c', long, value_enum)]
    category: Option<Category>,

    /// passage length
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// custom passage to type instead of one from the corpus
    #[clap(short = 'p', long, value_parser = non_blank)]
    prompt: Option<String>,

    /// start with advanced stats shown
    #[clap(long)]
    stats: bool,

    /// write the recent test history as CSV and exit ("-" for stdout)
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("prompt must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

impl Cli {
    /// Layer the command line over the stored settings
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(category) = self.category {
            config.category = category;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.stats {
            config.show_stats = true;
        }
        config
    }
}

fn open_record_store() -> Result<SqliteRecordStore, Box<dyn Error>> {
    if let Some(path) = AppDirs::records_path() {
        match SqliteRecordStore::open(&path) {
            Ok(store) => return Ok(store),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "falling back to in-memory records")
            }
        }
    }
    Ok(SqliteRecordStore::in_memory()?)
}

fn export_history<S: RecordStore>(
    recorder: &ResultRecorder<S>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    if path.as_os_str() == "-" {
        export_history_csv(recorder.history(), io::stdout().lock())?;
    } else {
        export_history_csv(recorder.history(), File::create(path)?)?;
    }
    tracing::info!(rows = recorder.history().len(), "history exported");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        logging::init(&log_path);
    }

    let recorder = ResultRecorder::restore(open_record_store()?);

    if let Some(path) = &cli.export_history {
        return export_history(&recorder, path);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());
    tracing::info!(path = %config_store.path().display(), ?config, "config loaded");
    if let Err(err) = config_store.save(&config) {
        tracing::warn!(%err, "could not save config");
    }

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(SessionClock::tick_interval()),
    );
    let mut app = App::new(
        config,
        cli.prompt.clone(),
        config_store,
        recorder,
        runner.sender(),
        *runner.ticker(),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, S: RecordStore, E: TypingEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &Runner<E, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        if let Some(event) = runner.step() {
            app.handle_event(event);
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }
    Ok(())
}
