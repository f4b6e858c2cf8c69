use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stores: StoresConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit a span per HTTP request
    #[serde(default = "default_false")]
    pub log_requests: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoresConfig {
    /// Entities to load into the in-memory stores at startup
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            stores: StoresConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_requests: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("LABELSCOPE_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("LABELSCOPE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid LABELSCOPE_PORT '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("LABELSCOPE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("LABELSCOPE_LOG_REQUESTS")
            && let Ok(enabled) = val.parse::<bool>()
        {
            self.logging.log_requests = enabled;
        }

        if let Ok(val) = std::env::var("LABELSCOPE_SEED_FILE") {
            self.stores.seed_file = Some(val).filter(|path| !path.is_empty());
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}
