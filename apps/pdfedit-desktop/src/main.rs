//! PDF editor desktop binary
//!
//! Parses arguments, sets up logging and opens the main window.

use clap::Parser;
use pdfedit_desktop::config::{AppConfig, Args};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfedit=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PDF editor v{}", env!("CARGO_PKG_VERSION"));
    let config = AppConfig::from(args);
    tracing::info!(layout = ?config.layout, signer = %config.signer_program, "configuration");

    pdfedit_desktop::run(config)
}
