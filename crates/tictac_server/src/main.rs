//! tictac_server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Cli::parse().resolve()?;
    info!(?config, "Starting tictac_server");
    tictac_server::serve(config).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictac_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
