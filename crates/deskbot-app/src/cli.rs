//! CLI argument definitions for the Deskbot binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Deskbot — an AI customer-support chat service grounded on a FAQ corpus.
#[derive(Parser, Debug)]
#[command(name = "deskbot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Path to the FAQ corpus CSV.
    #[arg(long = "corpus")]
    pub corpus: Option<PathBuf>,

    /// Data directory for the SQLite conversation log.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DESKBOT_CONFIG env var > ./deskbot.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("DESKBOT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("deskbot.toml")
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > DESKBOT_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("DESKBOT_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the corpus path.
    ///
    /// Priority: --corpus flag > config file value.
    pub fn resolve_corpus(&self, config_path: &str) -> PathBuf {
        self.corpus
            .clone()
            .unwrap_or_else(|| PathBuf::from(config_path))
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > config file value.
    pub fn resolve_data_dir(&self, config_dir: &str) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(config_dir))
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}
