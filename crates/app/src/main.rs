use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use course_core::model::Playlist;
use services::{AppServices, PlayerController, ProgressPersistence, load_playlist_file};
use storage::repository::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPlaylistPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPlaylistPath { raw } => {
                write!(f, "invalid --playlist value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn playlist(&self) -> Arc<Playlist> {
        self.services.playlist()
    }

    fn progress(&self) -> ProgressPersistence {
        self.services.progress()
    }
}

struct Args {
    db_url: String,
    playlist: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui     [--db <sqlite_url>] [--playlist <file.json>]");
    eprintln!("  cargo run -p app -- status [--db <sqlite_url>] [--playlist <file.json>]");
    eprintln!("  cargo run -p app -- reset  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://course.sqlite3");
    eprintln!("  --playlist <built-in sample course>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, COURSE_PLAYLIST, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Status,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "status" => Some(Self::Status),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("COURSE_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "course.sqlite3".into());
        db_url = normalize_sqlite_url(db_url);
        let mut playlist = std::env::var("COURSE_PLAYLIST")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--playlist" => {
                    let value = require_value(args, "--playlist")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidPlaylistPath { raw: value });
                    }
                    playlist = Some(PathBuf::from(value));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, playlist })
    }

    fn load_playlist(&self) -> Result<Playlist, Box<dyn std::error::Error>> {
        match &self.playlist {
            Some(path) => Ok(load_playlist_file(path)?),
            None => Ok(Playlist::sample_course()),
        }
    }
}

fn is_memory_url(url: &str) -> bool {
    url.trim().starts_with("sqlite::memory:")
}

fn normalize_sqlite_url(raw: String) -> String {
    if is_memory_url(&raw) {
        return raw.trim().to_string();
    }

    let trimmed = raw.trim();
    let path_str = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the player.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    info!(db = %parsed.db_url, command = ?cmd, "storage ready");

    match cmd {
        Command::Ui => {
            let playlist = parsed.load_playlist()?;
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                services: AppServices::new(&storage, playlist),
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Course Player")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Status => {
            let playlist = parsed.load_playlist()?;
            let services = AppServices::new(&storage, playlist);
            let player = services.load_player().await;
            print_status(&player);
            Ok(())
        }
        Command::Reset => {
            ProgressPersistence::new(Arc::clone(&storage.local))
                .clear()
                .await?;
            Ok(())
        }
    }
}

fn print_status(player: &PlayerController) {
    for entry in player.playlist().iter() {
        let record = player.record(entry.id());
        let mark = if record.is_watched() { "x" } else { " " };
        println!(
            "[{mark}] {:<4} {:>3}%  {:<10} {}",
            entry.id(),
            record.progress(),
            record.status().as_str(),
            entry.title()
        );
    }
    println!(
        "course progress: {}% ({} of {} watched)",
        player.course_progress(),
        player.watched_count(),
        player.total_videos()
    );
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_memory_url(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "fatal");
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn absolute_sqlite_urls_are_kept() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/course.sqlite3".into()),
            "sqlite:///tmp/course.sqlite3"
        );
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn memory_urls_with_options_stay_in_memory() {
        let url = normalize_sqlite_url("sqlite::memory:?cache=shared".into());
        assert_eq!(url, "sqlite::memory:?cache=shared");
        assert!(prepare_sqlite_file(&url).is_ok());
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("data/course.sqlite3".into());
        let path = url.strip_prefix("sqlite://").unwrap();
        assert!(std::path::Path::new(path).is_absolute(), "{url}");
        assert!(url.ends_with("data/course.sqlite3"), "{url}");
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&["--db", "sqlite::memory:", "--playlist", "course.json"]).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.playlist, Some(PathBuf::from("course.json")));
    }

    #[test]
    fn missing_flag_value_is_reported() {
        let err = parse(&["--db"]).err().unwrap();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--db" }));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = parse(&["--deck"]).err().unwrap();
        assert_eq!(err.to_string(), "unknown argument: --deck");
    }

    #[test]
    fn subcommands_are_recognized() {
        assert_eq!(Command::from_arg("status"), Some(Command::Status));
        assert_eq!(Command::from_arg("reset"), Some(Command::Reset));
        assert_eq!(Command::from_arg("seed"), None);
    }
}
