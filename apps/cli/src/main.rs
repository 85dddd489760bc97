//! nbcookbook CLI — documentation builds for tutorial notebook collections.
//!
//! Enriches every notebook with a generated cloud setup cell, feeds
//! notebook tags into a build-wide index, and emits the index page's
//! template context for the site generator.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
