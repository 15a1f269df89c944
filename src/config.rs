//! Configuration manager for credstore.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::user::User;

const DEFAULT_CONFIG_PATH: &str = "credstore.yaml";
const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// OAuth2 providers accepted by `new_from_oauth2`.
    pub providers: Vec<String>,
    /// Deadline applied to every store operation, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Users inserted when a memory store is built from this file.
    #[serde(skip_serializing)]
    pub seed: Vec<User>,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            providers: vec![DEFAULT_PROVIDER.to_owned()],
            timeout_ms: None,
            seed: Vec::new(),
            postgres: None,
            path: PathBuf::new(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Deadline for a single store operation.
    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Parse a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads the `credstore.yaml` file from the specified path or the default
    /// location.
    ///
    /// A missing or malformed file is logged and replaced by defaults.
    pub fn read(self) -> Self {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(config) => {
                    tracing::debug!(path = %file_path.display(), seed = config.seed.len(), "configuration loaded");
                    config.path(file_path)
                },
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`credstore.yaml` file not readable, using defaults");
        Self::default()
    }
}
