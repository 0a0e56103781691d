//! Server configuration.
//!
//! Settings come from an optional YAML file, then command-line flags (or
//! their environment variables) override whatever the file set:
//!
//! ```yaml
//! server:
//!   listen_addr: "0.0.0.0:4221"
//!   read_timeout_secs: 30
//!   write_timeout_secs: 30
//! static_files:
//!   directory: "/tmp/www"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::http::connection::Timeouts;

/// Command-line interface.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "hearth")]
#[command(about = "Minimal HTTP/1.1 server")]
#[command(version)]
pub struct Cli {
    /// Directory served by the /files/ endpoints
    #[arg(long, env = "HEARTH_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Seconds to wait for request bytes before dropping the connection
    #[arg(long, env = "HEARTH_READ_TIMEOUT")]
    pub read_timeout_secs: Option<u64>,

    /// Seconds allowed for writing one response
    #[arg(long, env = "HEARTH_WRITE_TIMEOUT")]
    pub write_timeout_secs: Option<u64>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4221".to_string(),
            read_timeout_secs: 30,
            write_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub directory: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Builds the effective configuration: the `--config` file if one was
    /// given, otherwise the defaults, with explicit flags applied on top.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        Ok(base.with_overrides(cli))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(directory) = &cli.directory {
            self.static_files.directory = directory.clone();
        }
        if let Some(listen) = &cli.listen {
            self.server.listen_addr = listen.clone();
        }
        if let Some(secs) = cli.read_timeout_secs {
            self.server.read_timeout_secs = secs;
        }
        if let Some(secs) = cli.write_timeout_secs {
            self.server.write_timeout_secs = secs;
        }
        self
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_secs(self.server.read_timeout_secs),
            write: Duration::from_secs(self.server.write_timeout_secs),
        }
    }
}
