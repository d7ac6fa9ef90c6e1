//! Dispatch configuration.
//!
//! Configuration lives in /etc/dispatch/config.toml; set DISPATCH_CONFIG
//! to point somewhere else (tests, dev checkouts). A missing or unreadable
//! file falls back to defaults — the config is an operator convenience,
//! not pipeline state.

use crate::forest::ForestParams;
use crate::trainer::TrainParams;
use crate::vectorizer::DEFAULT_MAX_FEATURES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/dispatch";
const CONFIG_FILE: &str = "config.toml";

/// Dispatch data directory (datasets, model artifacts)
pub const DATA_DIR: &str = "/var/lib/dispatch";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "DISPATCH_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Historical ticket dataset ({"tickets": [...]})
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Trained model artifact
    #[serde(default = "default_model_file")]
    pub model_file: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DATA_DIR).join("tickets.json")
}

fn default_model_file() -> PathBuf {
    PathBuf::from(DATA_DIR).join("dispatch_model.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            model_file: default_model_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for dispatchd
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen_addr: default_listen_addr() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_n_trees() -> usize {
    200
}

fn default_max_depth() -> usize {
    20
}

fn default_min_samples_split() -> usize {
    5
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            max_features: default_max_features(),
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            seed: default_seed(),
        }
    }
}

impl TrainingConfig {
    pub fn to_train_params(&self) -> TrainParams {
        TrainParams {
            test_fraction: self.test_fraction,
            max_features: self.max_features,
            forest: ForestParams {
                n_trees: self.n_trees,
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
                seed: self.seed,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl DispatchConfig {
    pub fn config_path() -> PathBuf {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => warn!("Ignoring malformed config {}: {}", path.display(), e),
                },
                Err(e) => warn!("Cannot read config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        crate::persist::atomic_write_str(&path, &content)
    }
}
