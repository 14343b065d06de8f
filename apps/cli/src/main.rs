//! adpt CLI: declare a document's structure once, regenerate its master file.
//!
//! Creates and maintains `document.json` and assembles the AsciiDoc master
//! document from it.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
