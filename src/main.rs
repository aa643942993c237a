mod cli;
mod config;
mod dingbats;
mod glossary;
mod grep;
mod lookup;
mod passthrough;
mod stats;
mod translate;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Passthrough => passthrough::run(global)?,
        Commands::Deepl(args) => translate::run(global, args)?,
        Commands::Stats(args) => stats::run(global, args)?,
        Commands::Grep(args) => grep::run(global, args)?,
        Commands::FixupDingbats => dingbats::run(global)?,
        Commands::Add(args) => lookup::run_add(global, args)?,
        Commands::Lookup(args) => lookup::run_lookup(global, args)?,
    }

    Ok(())
}
