use bean::api::{BeanApi, BeanPaths, ConfigAction};
use bean::config::BeanConfig;
use bean::error::{BeanError, Result};
use bean::model::{Note, NotesByTopic};
use bean::notes::bear::BearNoteSource;
use bean::notes::NoteSource;
use bean::store::fs::FileCardStore;
use chrono::Utc;
use clap::Parser;
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod args;
mod print;
use args::{Cli, Commands};
use print::*;

const LOG_ENV: &str = "BEAN_LOG";
const HOME_ENV: &str = "BEAN_HOME";
const NOTES_DB_ENV: &str = "BEAN_NOTES_DB";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let api = init_api()?;

    match cli.command {
        Some(Commands::Sync) => handle_sync(&api),
        Some(Commands::Topics) | None => handle_topics(&api),
        Some(Commands::Next { topic }) => handle_next(&api, &topic),
        Some(Commands::Reflect {
            topic,
            key,
            quality,
        }) => handle_reflect(&api, &topic, &key, quality),
        Some(Commands::Cards { topic }) => handle_cards(&api, &topic),
        Some(Commands::Config { key, value }) => handle_config(&api, key, value),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

type App = BeanApi<FileCardStore, LazyBearSource>;

fn init_api() -> Result<App> {
    let data_dir = match std::env::var_os(HOME_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("com", "bean", "bean")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                BeanError::StoreUnavailable("Could not determine data dir".to_string())
            })?,
    };
    let paths = BeanPaths::new(data_dir);
    let config = BeanConfig::load(paths.config_dir())?;
    let timeout = config.lock_timeout();

    let notes_db = match std::env::var_os(NOTES_DB_ENV) {
        Some(path) => PathBuf::from(path),
        None => {
            let home = BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            config.notes_db_path(&home)
        }
    };

    let store = FileCardStore::open(paths.cards_dir(), timeout)?;
    let notes = LazyBearSource {
        path: notes_db,
        marker: config.topic_marker.clone(),
        timeout,
        source: OnceLock::new(),
    };
    Ok(BeanApi::new(store, notes, paths, timeout))
}

/// Opens the notes database on first use, so commands that only read the
/// schedule work without it.
struct LazyBearSource {
    path: PathBuf,
    marker: String,
    timeout: Duration,
    source: OnceLock<BearNoteSource>,
}

impl LazyBearSource {
    fn source(&self) -> Result<&BearNoteSource> {
        if let Some(source) = self.source.get() {
            return Ok(source);
        }
        let opened = BearNoteSource::open(&self.path, &self.marker, self.timeout)?;
        Ok(self.source.get_or_init(|| opened))
    }
}

impl NoteSource for LazyBearSource {
    fn all_notes_by_topic(&self) -> Result<NotesByTopic> {
        self.source()?.all_notes_by_topic()
    }

    fn note_by_key(&self, key: &str) -> Result<Note> {
        self.source()?.note_by_key(key)
    }
}

fn handle_sync(api: &App) -> Result<()> {
    let result = api.reconcile()?;
    print_messages(&result.messages);
    if let Some(report) = &result.sync_report {
        print_report(report);
    }
    Ok(())
}

fn handle_topics(api: &App) -> Result<()> {
    let result = api.list_topics()?;
    print_topics(&result.topics);
    print_messages(&result.messages);
    Ok(())
}

fn handle_next(api: &App, topic: &str) -> Result<()> {
    let result = api.next_card(topic)?;
    if let Some(next) = &result.next {
        print_next(next);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_reflect(api: &App, topic: &str, key: &str, quality: i64) -> Result<()> {
    let result = api.reflect(topic, key, quality)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_cards(api: &App, topic: &str) -> Result<()> {
    let result = api.cards(topic)?;
    print_cards(&result.listed_cards, Utc::now());
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(api: &App, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = api.config(action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}
