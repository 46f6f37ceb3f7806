//! Configuration loading
//!
//! Every setting is resolved with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! Settings are built once by the binary and passed explicitly to the
//! components that need them; nothing here is cached globally.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_DB_PATH: &str = "ADPULSE_DB_PATH";
pub const ENV_REPORTS_DIR: &str = "ADPULSE_REPORTS_DIR";
pub const ENV_API_HOST: &str = "ADPULSE_API_HOST";
pub const ENV_API_PORT: &str = "ADPULSE_API_PORT";
pub const ENV_CONFIG_FILE: &str = "ADPULSE_CONFIG";

pub const DEFAULT_DB_FILE: &str = "adpulse.db";
pub const DEFAULT_REPORTS_DIR: &str = "reports";
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 8000;

/// Optional values read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub db_path: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
}

/// Runtime configuration shared by the CLI and the API server
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub reports_dir: PathBuf,
    pub api_host: String,
    pub api_port: u16,
}

/// Values supplied on the command line; each one wins over env and TOML
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
}

impl Settings {
    /// Resolve settings from CLI overrides, environment, TOML and defaults
    ///
    /// A missing config file is not an error. A config file that exists but
    /// does not parse is logged and ignored so the tools still start.
    pub fn load(cli: &CliOverrides) -> Settings {
        let toml_config = match config_file_path() {
            Some(path) if path.exists() => match load_toml_config(&path) {
                Ok(config) => {
                    debug!("Loaded config file {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("{}; falling back to defaults", e);
                    TomlConfig::default()
                }
            },
            _ => TomlConfig::default(),
        };

        Self::resolve(cli, &toml_config)
    }

    /// Apply the priority order against an already-loaded TOML config
    pub fn resolve(cli: &CliOverrides, toml_config: &TomlConfig) -> Settings {
        let db_path = cli
            .db_path
            .clone()
            .or_else(|| env_path(ENV_DB_PATH))
            .or_else(|| toml_config.db_path.clone())
            .unwrap_or_else(|| default_data_dir().join(DEFAULT_DB_FILE));

        let reports_dir = cli
            .reports_dir
            .clone()
            .or_else(|| env_path(ENV_REPORTS_DIR))
            .or_else(|| toml_config.reports_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR));

        let api_host = cli
            .api_host
            .clone()
            .or_else(|| std::env::var(ENV_API_HOST).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| toml_config.api_host.clone())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let api_port = cli
            .api_port
            .or_else(|| match std::env::var(ENV_API_PORT) {
                Ok(raw) => match raw.trim().parse::<u16>() {
                    Ok(port) => Some(port),
                    Err(_) => {
                        warn!("Ignoring invalid {}='{}'", ENV_API_PORT, raw);
                        None
                    }
                },
                Err(_) => None,
            })
            .or(toml_config.api_port)
            .unwrap_or(DEFAULT_API_PORT);

        Settings {
            db_path: expand_home(db_path),
            reports_dir: expand_home(reports_dir),
            api_host,
            api_port,
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::ConfigFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Location of the TOML config file: `$ADPULSE_CONFIG`, else the user config dir
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = env_path(ENV_CONFIG_FILE) {
        return Some(path);
    }
    dirs::config_dir().map(|d| d.join("adpulse").join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("adpulse"))
        .unwrap_or_else(|| PathBuf::from("./adpulse_data"))
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or(path),
        Err(_) => path,
    }
}
