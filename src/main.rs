// taniterm - terminal dashboard for the taniclaw farm agent
//
// Architecture:
// - API client (reqwest): talks to the taniclaw backend, or serves a
//   canned demo farm in demo mode
// - Loader: spawns API calls and reports completions over an mpsc channel,
//   with per-region tokens so stale responses are discarded
// - Renderer: pure view-model builders, testable without a terminal
// - TUI (ratatui): event loop, pages, overlays
// - Logging: tracing captured to an in-memory buffer for the logs overlay

mod api;
mod cli;
mod config;
mod demo;
mod format;
mod loader;
mod logging;
mod model;
mod render;
mod tui;
mod util;

use anyhow::Result;
use api::ApiClient;
use clap::Parser;
use config::Config;
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    if cli::handle_command(&cli) {
        return Ok(());
    }

    // First run: write a commented config template so options are visible
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    config.apply_cli(&cli);

    // Logs go to the in-memory buffer (the TUI owns the screen), plus an
    // optional rotating file. Precedence: RUST_LOG > config level.
    let log_buffer = LogBuffer::new();
    let default_filter = format!("taniterm={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> = if config.logging.file {
        match Config::log_dir() {
            Some(dir) if std::fs::create_dir_all(&dir).is_ok() => {
                let appender = tracing_appender::rolling::daily(&dir, "taniterm.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                if config.logging.json {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(TuiLogLayer::new(log_buffer.clone()))
                        .with(
                            tracing_subscriber::fmt::layer()
                                .json()
                                .with_writer(non_blocking)
                                .with_ansi(false),
                        )
                        .init();
                } else {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(TuiLogLayer::new(log_buffer.clone()))
                        .with(
                            tracing_subscriber::fmt::layer()
                                .with_writer(non_blocking)
                                .with_ansi(false),
                        )
                        .init();
                }
                Some(guard)
            }
            _ => {
                eprintln!("Warning: could not create log directory, file logging disabled");
                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .init();
                None
            }
        }
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(log_buffer.clone()))
            .init();
        None
    };

    let api = if config.demo {
        tracing::info!("Running in demo mode with a canned farm");
        Arc::new(ApiClient::demo(demo::DemoFarm::seeded()))
    } else {
        tracing::info!("Connecting to {}", config.api_url);
        Arc::new(ApiClient::new(&config.api_url))
    };

    tui::run_tui(api, log_buffer, config).await
}
