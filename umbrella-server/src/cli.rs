use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use umbrella_core::{Config, ReportProvider, provider_from_config};

use crate::app::{self, AppState, MyUmbrellaResponse};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "myumbrella", version, about = "Tells you if you need your umbrella")]
pub struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service (the default).
    Serve {
        /// Listen address, e.g. "127.0.0.1:8080".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the umbrella report for a city and exit.
    Check {
        /// City or place name.
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        let api_key = config
            .api_key()
            .context("Cannot start without an OpenWeather API key")?;
        let provider: Arc<dyn ReportProvider> = provider_from_config(&config, api_key)?.into();

        match self.command.unwrap_or(Command::Serve { bind: None }) {
            Command::Serve { bind } => {
                let bind = bind.unwrap_or(config.server.bind);
                app::serve(&bind, AppState::new(provider)).await
            }
            Command::Check { city } => {
                let report = provider
                    .get_report(&city)
                    .await
                    .with_context(|| format!("Failed to get umbrella report for '{city}'"))?;

                let response = MyUmbrellaResponse::from(report);
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
        }
    }
}
