//! Server configuration: an optional TOML file with command line overrides

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use syzygy_tables_core::DEFAULT_BACKEND;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("base_url must start with http and end with /: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Syzygy tablebase query server", long_about = None)]
pub struct Args {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(long)]
    pub bind: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Probe backend URL
    #[arg(long)]
    pub backend: Option<String>,

    /// Precomputed stats file
    #[arg(long)]
    pub stats: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub backend: String,
    pub base_url: String,
    pub name: String,
    pub stats_path: PathBuf,
    /// Mark the next histogram ply too when the root dtz may be rounded.
    pub rounding: bool,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 9000,
            backend: DEFAULT_BACKEND.to_string(),
            base_url: "http://localhost:9000/".to_string(),
            name: "syzygy-tables".to_string(),
            stats_path: PathBuf::from("stats.json"),
            rounding: true,
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::open(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate()?;
        Ok(config)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(bind) = &args.bind {
            self.bind = bind.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(backend) = &args.backend {
            self.backend = backend.clone();
        }
        if let Some(stats) = &args.stats {
            self.stats_path = stats.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http") || !self.base_url.ends_with('/') {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
