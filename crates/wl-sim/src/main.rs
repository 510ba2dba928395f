use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    enumerate::{self, EnumerateArgs},
    run::{self, RunArgs},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod input;

#[derive(Parser, Debug)]
#[command(name = "wl-sim", about = "Wang-Landau density-of-states sampler for RNA secondary structures")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the density of states of a sequence.
    Run(RunArgs),
    /// Print the exact low-energy structures of a sequence.
    Enumerate(EnumerateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Enumerate(args) => enumerate::run(&args),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
