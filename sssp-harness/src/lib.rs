use clap::{Parser, Subcommand};

#[macro_use]
pub mod utils;
pub mod charts;
pub mod commands;
pub mod configs;
pub mod sweep;

/// Benchmark sweep harness for single-source shortest path implementations
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Run(commands::run::RunArgs),
    Plan(commands::plan::PlanArgs),
    Report(commands::report::ReportArgs),
}

pub fn entry(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Run(cmd) => cmd.run().map(|_| ()),
        Commands::Plan(cmd) => cmd.run(),
        Commands::Report(cmd) => cmd.run(),
    }
}
