//! Binary crate for the `myumbrella` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Wiring the report provider into the HTTP layer
//! - Serving `GET /myumbrella`

use clap::Parser;

mod app;
mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
