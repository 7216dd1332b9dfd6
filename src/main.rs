//! Photo Album - search and upload photos in a labeled album
//!
//! A command line client for the photo album API: searches render as cards
//! whose images load with retry and backoff, uploads carry custom labels.

mod commands;
mod config;
mod error;
mod logging;
mod photos;
mod render;
mod search;
mod transport;
mod upload;
mod utils;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use commands::AppState;
use config::AppConfig;
use error::AlbumResult;
use render::MemoryView;

#[derive(Parser)]
#[command(
    name = "photo-album",
    version,
    about = "Search and upload photos",
    after_help = "The gateway rejects requests without an API key. Set \"api\": { \"key\": \"...\" } in the config file (--config, or config.json in the user config directory under photo-album/)."
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search photos by label
    Search {
        /// Search text; may be empty
        #[arg(default_value = "")]
        query: String,
    },
    /// Upload a photo
    Upload {
        file: PathBuf,

        /// Comma-separated custom labels
        #[arg(long, default_value = "")]
        labels: String,
    },
}

async fn run_search(state: &AppState, view: &MemoryView, query: &str) {
    state.search.submit(query).await;
    state.search.settle().await;
    print!("{}", view.snapshot());
}

async fn run_upload(state: &mut AppState, file: &Path, labels: &str) -> AlbumResult<()> {
    // An unreadable file leaves nothing selected; submit reports it
    let _ = state.upload.select_path(file).await;
    state.upload.set_custom_labels(labels);

    let result = state.upload.submit().await;
    println!("{}", state.upload.status());
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init(cli.debug);

    log_info!("main", "=== Photo Album Starting ===");
    log_info!("main", "Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log_error!("main", "Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log_info!("main", "API endpoint: {}", config.api.base_url());
    for warning in config.warnings() {
        log_warn!("main", "{}", warning);
    }

    let view = Arc::new(MemoryView::new());
    let mut state = match AppState::new(&config, view.clone()) {
        Ok(state) => state,
        Err(e) => {
            log_error!("main", "Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Search { query } => {
            run_search(&state, &view, &query).await;
            ExitCode::SUCCESS
        }
        Command::Upload { file, labels } => match run_upload(&mut state, &file, &labels).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log_error!("main", "Upload failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
