//! Joingraph CLI - join-graph extraction from SQL files

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{count, extract};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Extract(args) => extract::execute(args, &cli.global),
        cli::Commands::Count(args) => count::execute(args),
    }
}
