//! Command-line interface parsing for the national site browser
//!
//! This module handles parsing of CLI arguments using clap, including the
//! cache file location and the places API key.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::DEFAULT_CACHE_FILE;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// No places API key was given on the command line or in the environment
    #[error("Missing API key: pass --api-key or set MAPQUEST_API_KEY (a .env file works too)")]
    MissingApiKey,
}

/// Browse U.S. National Park Service sites by state
#[derive(Parser, Debug)]
#[command(name = "npsites")]
#[command(about = "Browse national sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// Cache file holding previously fetched pages and searches
    ///
    /// Delete this file to force everything to be fetched again.
    #[arg(long, value_name = "PATH", env = "NPSITES_CACHE_FILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// MapQuest API key used for nearby place searches
    #[arg(long, value_name = "KEY", env = "MAPQUEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Report whether each lookup was served from cache or fetched (logged to stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Location of the cache file
    pub cache_file: PathBuf,
    /// MapQuest API key
    pub api_key: String,
    /// Default log filter when RUST_LOG is unset
    pub log_filter: &'static str,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError::MissingApiKey)` if the API key is absent or blank
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CliError::MissingApiKey)?
            .to_string();

        Ok(StartupConfig {
            cache_file: cli.cache_file.clone(),
            api_key,
            log_filter: if cli.verbose { "info" } else { "warn" },
        })
    }
}
