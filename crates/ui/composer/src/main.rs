mod action;
mod app;
mod cli;
mod commands;
mod components;
mod config;
mod errors;
mod logging;
mod state;
mod theme;
mod tui;

use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;

use crate::{
    app::App,
    cli::{Cli, Cmd},
    config::{Config, LOG_FILE},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = Config::new()?;
    config.apply_cli(&args);
    errors::init(&config.config.data_dir.join(&*LOG_FILE))?;
    let _log_guard = logging::init(&config.config.data_dir)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_dir = %config.config.config_dir.display(),
        "composer starting"
    );

    match args.selected() {
        Cmd::Fields { json } => commands::print_fields(json),
        Cmd::Submit { name, fields } => {
            let gateway = config.gateway()?;
            commands::submit(&gateway, &name, &fields).await
        }
        Cmd::Run => {
            let gateway = Arc::new(config.gateway()?);
            let mut app = App::new(config, gateway)?;
            app.run().await
        }
    }
}
