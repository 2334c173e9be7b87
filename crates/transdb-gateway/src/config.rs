//! Gateway configuration.
//!
//! Settings come from three layers: built-in defaults, an optional TOML file
//! given with `--config`, and command line flags. Later layers win.
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:8080"   # or: port = 8080
//!
//! [database]
//! path = "./translations.db"
//!
//! [xliff]
//! export_path = "./export"
//! queue_capacity = 100
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Default capacity of the export queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// transdb HTTP/JSON gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "transdb-gateway")]
#[command(version, about = "HTTP/JSON API for the transdb translation store")]
pub struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on for HTTP requests [default: 0.0.0.0:8080].
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Path to the SQLite database [default: ./translations.db].
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Directory updated domains are re-exported to [default: ./export].
    #[arg(short, long)]
    pub export_dir: Option<PathBuf>,

    /// Pending exports buffered before writers wait [default: 100].
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Path to the SQLite database.
    pub database_path: PathBuf,
    /// Directory exports are written to.
    pub export_dir: PathBuf,
    /// Capacity of the export queue.
    pub queue_capacity: usize,
}

impl GatewayConfig {
    /// Resolve the configuration from defaults, the `--config` file and flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = &args.config {
            config.apply_file(ConfigFile::read(path)?);
        }
        config.apply_args(args);
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(listen) = file.server.listen {
            self.listen_addr = listen;
        } else if let Some(port) = file.server.port {
            self.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(path) = file.database.path {
            self.database_path = path;
        }
        if let Some(path) = file.xliff.export_path {
            self.export_dir = path;
        }
        if let Some(capacity) = file.xliff.queue_capacity {
            self.queue_capacity = capacity.max(1);
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(listen) = &args.listen {
            self.listen_addr = listen.clone();
        }
        if let Some(path) = &args.database {
            self.database_path = path.clone();
        }
        if let Some(path) = &args.export_dir {
            self.export_dir = path.clone();
        }
        if let Some(capacity) = args.queue_capacity {
            self.queue_capacity = capacity.max(1);
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_path: PathBuf::from("./translations.db"),
            export_dir: PathBuf::from("./export"),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Raw TOML structure of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    xliff: XliffSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    listen: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabaseSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct XliffSection {
    export_path: Option<PathBuf>,
    queue_capacity: Option<usize>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}
