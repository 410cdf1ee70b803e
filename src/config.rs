//! Configuration manager for student records.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;
use crate::student::validation::DEFAULT_STUDENT_ID_LENGTH;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Public URL of current instance.
    pub url: String,
    /// Listening port, `PORT` environment variable wins.
    pub port: Option<u16>,
    /// Whole-request timeout in seconds.
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub version: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Related to PostgreSQL configuration.
    /// Students are kept in memory when absent.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to input validation.
    #[serde(default)]
    pub validation: Validation,
    /// Related to metrics, tracing and log exports.
    #[serde(default)]
    pub telemetry: Telemetry,
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
    /// Seconds to wait for a connection or a query.
    pub timeout: Option<u64>,
}

/// Validation configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Validation {
    /// Exact length of a `studentId`.
    pub student_id_length: usize,
    /// Clients must supply `studentId`, `program`, `semester` and `status`.
    pub require_student_id: bool,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            student_id_length: DEFAULT_STUDENT_ID_LENGTH,
            require_student_id: false,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// Install Prometheus recorder and expose `/metrics`.
    pub metrics: bool,
    /// Export spans over OTLP.
    pub tracing: bool,
    /// OTLP endpoint receiving logs.
    pub logs_endpoint: Option<String>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            metrics: true,
            tracing: false,
            logs_endpoint: None,
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Port to listen on.
    pub fn port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .or(self.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(&file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)));
                        },
                    };

                // set app version.
                config.version = VERSION.to_owned();
                config.path = file_path;

                // an empty URL stays relative.
                if !config.url.is_empty() {
                    config.url = self.normalize_url(&config.url)?;
                }

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, path = ?self.path, "cannot load `config.yaml` file");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }
}
