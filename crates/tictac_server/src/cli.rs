//! Command-line interface for tictac_server.

use clap::Parser;
use std::path::PathBuf;
use tictac_server::{ConfigError, ServerConfig};
use tracing::instrument;

/// Tic-tac-toe room server
#[derive(Parser, Debug)]
#[command(name = "tictac_server")]
#[command(about = "Real-time two-player tic-tac-toe over WebSocket", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to (overrides config and HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory with the browser UI
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl Cli {
    /// Layers defaults, config file, environment, then flags.
    #[instrument(skip(self))]
    pub fn resolve(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        }
        .apply_env()?;

        if let Some(host) = self.host {
            config = config.with_host(host);
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(dir) = self.static_dir {
            config = config.with_static_dir(dir);
        }
        Ok(config)
    }
}
