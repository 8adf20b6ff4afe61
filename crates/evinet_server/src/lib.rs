//! HTTP server for the evidence network graph store.

pub mod config;
pub mod http;

pub use config::{CliArgs, ConfigError, ServerConfig, DEFAULT_PORT};
pub use http::{router, ApiError, AppState, DynGraphRepository};

use evinet_core::db::{open_db, DbError};
use evinet_core::{InMemoryGraphRepository, RepoError, SqliteGraphRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum StartupError {
    Config(ConfigError),
    Logging(String),
    Database(DbError),
    Repository(RepoError),
    Io(std::io::Error),
}

impl Display for StartupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "cannot start logging: {message}"),
            Self::Database(err) => write!(f, "cannot open database: {err}"),
            Self::Repository(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StartupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
            Self::Database(err) => Some(err),
            Self::Repository(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for StartupError {
    fn from(value: DbError) -> Self {
        Self::Database(value)
    }
}

impl From<RepoError> for StartupError {
    fn from(value: RepoError) -> Self {
        Self::Repository(value)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Opens the store selected by `config`.
pub fn open_repository(config: &ServerConfig) -> Result<DynGraphRepository, StartupError> {
    match &config.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let repo = SqliteGraphRepository::try_new(open_db(path)?)?;
            info!("event=store_open module=server status=ok backend=sqlite");
            Ok(Box::new(repo))
        }
        None => {
            info!("event=store_open module=server status=ok backend=memory");
            Ok(Box::new(InMemoryGraphRepository::new()))
        }
    }
}
