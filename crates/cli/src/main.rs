//! ledgerboot CLI entry point.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use config::{Config, Flags};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let flags = Flags::parse();

    if let Err(e) = Config::from_flags(flags).and_then(commands::run) {
        error!(kind = ?e.kind(), "aborting");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
