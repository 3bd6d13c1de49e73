//! npsites - Browse U.S. National Park Service sites from the terminal
//!
//! Lists the national sites of a state and the places near a chosen site.
//! Everything fetched is kept in a local cache file so repeat visits work
//! without network calls.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use npsites::cache::{CacheStore, NamespacedCache};
use npsites::cli::{Cli, StartupConfig};
use npsites::data::{NpsClient, PlacesClient};
use npsites::lookup::{SiteLookup, WebSource};
use npsites::session::Session;

/// Initialize the tracing subscriber for logging
///
/// RUST_LOG takes precedence over the default filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_filter);
    tracing::info!(cache_file = %config.cache_file.display(), "npsites starting");

    let cache = NamespacedCache::new(CacheStore::new(config.cache_file));
    let source = WebSource::new(NpsClient::new(), PlacesClient::new(config.api_key));
    let lookup = SiteLookup::new(cache, source);

    let stdin = io::stdin();
    let mut session = Session::new(lookup, stdin.lock(), io::stdout());
    match session.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
