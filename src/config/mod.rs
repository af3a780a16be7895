use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "memkv", version, about = "Volatile key-value store over HTTP")]
pub struct Args {
  /// JSON configuration file
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// Listening address, overrides the configuration file
  #[arg(long)]
  pub addr: Option<String>,

  /// Log filter, e.g. "info" or "memkv=debug"
  #[arg(long)]
  pub log_level: Option<String>,

  /// Largest request body accepted by the transport
  #[arg(long)]
  pub max_body_bytes: Option<usize>,
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
    }
  }
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
  /// HTTP listening address
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Request bodies above this size are refused before reaching the store
  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes: usize,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_server_addr() -> String {
  "0.0.0.0:80".to_string()
}

fn default_max_body_bytes() -> usize {
  1024 * 1024
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      max_body_bytes: default_max_body_bytes(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from a JSON file
  pub fn from_file(path: &Path) -> anyhow::Result<Self> {
    let config_str = fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

    let config: Config = serde_json::from_str(&config_str)
      .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

    Ok(config)
  }

  /// Build the effective configuration: file (or defaults), then flags
  pub fn load(args: &Args) -> anyhow::Result<Self> {
    let mut config = match &args.config {
      Some(path) => Self::from_file(path)?,
      None => Self::default(),
    };

    if let Some(addr) = &args.addr {
      config.server_addr = addr.clone();
    }
    if let Some(level) = &args.log_level {
      config.log.level = level.clone();
    }
    if let Some(max) = args.max_body_bytes {
      config.max_body_bytes = max;
    }

    Ok(config)
  }
}
