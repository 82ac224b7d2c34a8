mod config;

use std::fmt;

use chrono::NaiveDate;
use library_core::wire::{self, ReadingLogPayload};
use services::{Clock, LibraryServices};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidPort { raw: String },
    InvalidDate { raw: String },
    MissingPayload,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidDate { raw } => write!(f, "invalid --today value: {raw}"),
            ArgsError::MissingPayload => write!(f, "progress requires a payload file"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- serve    [--db <sqlite_url>] [--host <host>] [--port <port>]");
    eprintln!("  cargo run -p app -- progress <payload.json> [--today YYYY-MM-DD]");
    eprintln!();
    eprintln!("Defaults for serve:");
    eprintln!("  --db {}", config::DEFAULT_DB_URL);
    eprintln!("  --host {}", config::DEFAULT_HOST);
    eprintln!("  --port {}", config::DEFAULT_PORT);
    eprintln!();
    eprintln!("Environment (.env is honored):");
    eprintln!("  LIBRARY_DB_URL, LIBRARY_HOST, LIBRARY_PORT, RUST_LOG");
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve(Config),
    Progress {
        payload: String,
        today: Option<NaiveDate>,
    },
    Help,
}

impl Command {
    fn parse(argv: Vec<String>, env_config: Config) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        match args.next().as_deref() {
            None | Some("serve") => Self::parse_serve(&mut args, env_config),
            Some("progress") => Self::parse_progress(&mut args),
            Some("--help" | "-h") => Ok(Self::Help),
            Some(first) if first.starts_with("--") => {
                let mut rest = std::iter::once(first.to_string()).chain(args);
                Self::parse_serve(&mut rest, env_config)
            }
            Some(other) => Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }

    fn parse_serve(
        args: &mut impl Iterator<Item = String>,
        mut config: Config,
    ) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.database_url = value;
                }
                "--host" => config.host = require_value(args, "--host")?,
                "--port" => {
                    let value = require_value(args, "--port")?;
                    config.port = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                "--help" | "-h" => return Ok(Self::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        config.database_url = normalize_sqlite_url(config.database_url);
        Ok(Self::Serve(config))
    }

    fn parse_progress(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut payload = None;
        let mut today = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--today" => {
                    let value = require_value(args, "--today")?;
                    let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|_| ArgsError::InvalidDate { raw: value.clone() })?;
                    today = Some(parsed);
                }
                "--help" | "-h" => return Ok(Self::Help),
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if payload.is_none() => payload = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        let payload = payload.ok_or(ArgsError::MissingPayload)?;
        Ok(Self::Progress { payload, today })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
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

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "app=debug,api=debug,services=debug,storage=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&config.database_url)?;
    tracing::info!("opening database {}", config.database_url);

    let clock = Clock::default_clock();
    let services = LibraryServices::new_sqlite(&config.database_url, clock).await?;
    let app = api::router(api::AppState::new(&services, clock));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn progress(
    payload: &str,
    today: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(payload).await?;
    let log: ReadingLogPayload = serde_json::from_str(&raw)?;
    let today = today.unwrap_or_else(|| Clock::default_clock().today());
    let out = wire::compute_payload(log, today)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(argv, Config::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Serve(config) => serve(config).await,
        Command::Progress { payload, today } => progress(&payload, today).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn no_arguments_serves_with_environment_config() {
        let env_config = Config {
            database_url: "sqlite:///var/lib/library.sqlite3".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let command = Command::parse(Vec::new(), env_config.clone()).unwrap();
        assert_eq!(command, Command::Serve(env_config));
    }

    #[test]
    fn flags_override_environment() {
        let command = Command::parse(
            args(&["serve", "--db", "sqlite::memory:", "--port", "4000"]),
            Config::default(),
        )
        .unwrap();
        let Command::Serve(config) = command else {
            panic!("expected serve");
        };
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, config::DEFAULT_HOST);
    }

    #[test]
    fn bare_flags_imply_serve() {
        let command = Command::parse(args(&["--host", "::1"]), Config::default()).unwrap();
        assert!(matches!(command, Command::Serve(ref c) if c.host == "::1"));
    }

    #[test]
    fn progress_takes_payload_and_optional_day() {
        let command = Command::parse(
            args(&["progress", "log.json", "--today", "2024-02-29"]),
            Config::default(),
        )
        .unwrap();
        assert_eq!(
            command,
            Command::Progress {
                payload: "log.json".to_string(),
                today: NaiveDate::from_ymd_opt(2024, 2, 29),
            }
        );
    }

    #[test]
    fn argument_errors_are_reported() {
        assert!(matches!(
            Command::parse(args(&["progress"]), Config::default()),
            Err(ArgsError::MissingPayload)
        ));
        assert!(matches!(
            Command::parse(args(&["serve", "--port", "http"]), Config::default()),
            Err(ArgsError::InvalidPort { .. })
        ));
        assert!(matches!(
            Command::parse(args(&["progress", "x.json", "--today", "soon"]), Config::default()),
            Err(ArgsError::InvalidDate { .. })
        ));
        assert!(matches!(
            Command::parse(args(&["seed"]), Config::default()),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Command::parse(args(&["serve", "--db"]), Config::default()),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/library.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/library.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".to_string()),
            "sqlite::memory:"
        );
    }
}
