// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gk - gatekeep CLI

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{completions, inspect, render, simulate};

#[derive(Parser)]
#[command(
    name = "gk",
    version,
    about = "gatekeep - Counting semaphores for workflow executions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled workflow definition
    Render(render::RenderArgs),
    /// Run concurrent executions of the assembled workflow
    Simulate(simulate::SimulateArgs),
    /// Print the lock records rebuilt from a WAL
    Inspect(inspect::InspectArgs),
    /// Print a shell completion script
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    match cli.command {
        Commands::Render(args) => render::render(args),
        Commands::Simulate(args) => simulate::simulate(args).await,
        Commands::Inspect(args) => inspect::inspect(args),
        Commands::Completions(args) => {
            completions::completions::<Cli>(args);
            Ok(())
        }
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("GK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
