//! `book-server` exposes the book agent over HTTP and ships the corpus builder
//! and a one-shot question CLI.

pub mod config;
pub mod server;

pub use config::{ConfigError, Settings};
pub use server::{AppState, app_router, build_agent, run_server};

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).try_init().ok();
}

/// Install tracing, then read [`Settings`] so `.env` loading is logged.
pub fn init() -> Result<Settings, ConfigError> {
    init_tracing();
    Settings::from_env()
}
