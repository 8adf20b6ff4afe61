//! Server configuration.
//!
//! # Responsibility
//! - Resolve settings from defaults, an optional TOML file, environment and
//!   command-line flags, in that order of increasing precedence.
//!
//! # Invariants
//! - `db_path = None` selects the in-memory store.
//! - `log_dir` is always absolute after resolution.

use clap::Parser;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 4000;

/// Command-line flags; each one overrides file and environment values.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "evinet-server")]
#[command(version, about = "HTTP graph store for evidence networks", long_about = None)]
pub struct CliArgs {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    pub bind: Option<IpAddr>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database file; omit to keep the graph in memory.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Ignore any configured database file and keep the graph in memory.
    #[arg(long)]
    pub in_memory: bool,

    /// trace|debug|info|warn|error
    #[arg(long)]
    pub log_level: Option<String>,

    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            db_path: None,
            log_level: evinet_core::default_log_level().to_string(),
            log_dir: std::env::temp_dir().join("evinet").join("logs"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidEnv {
        key: &'static str,
        value: String,
    },
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidEnv { key, value } => write!(f, "invalid value for {key}: `{value}`"),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be absolute, got `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnv { .. } | Self::RelativeLogDir(_) => None,
        }
    }
}

impl ServerConfig {
    /// Resolves configuration for the current process.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::resolve_with_env(args, |key| std::env::var(key).ok())
    }

    /// Resolves configuration reading environment values through `env`.
    pub fn resolve_with_env(
        args: &CliArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.apply_args(args);
        if !config.log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(config.log_dir));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = env("EVINET_BIND") {
            self.bind = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "EVINET_BIND",
                value: value.clone(),
            })?;
        }
        // `PORT` is honoured for hosting platforms; `EVINET_PORT` wins.
        for key in ["PORT", "EVINET_PORT"] {
            if let Some(value) = env(key) {
                self.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key,
                    value: value.clone(),
                })?;
            }
        }
        if let Some(value) = env("EVINET_DB_PATH") {
            self.db_path = Some(PathBuf::from(value)).filter(|path| !path.as_os_str().is_empty());
        }
        if let Some(value) = env("EVINET_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = env("EVINET_LOG_DIR") {
            self.log_dir = PathBuf::from(value);
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(path) = &args.db_path {
            self.db_path = Some(path.clone());
        }
        if args.in_memory {
            self.db_path = None;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(dir) = &args.log_dir {
            self.log_dir = dir.clone();
        }
    }
}
