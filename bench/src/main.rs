mod catalog;
mod cli;
mod client;
mod config;
mod pipeline;
mod prompts;
mod run_log;
mod store;
mod verdict;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bench", version, about = "LLM benchmark on a fixed scheduling task")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate solutions and judge them, resuming prior progress
    Run {
        #[arg(long, default_value = "bench.toml")]
        config: PathBuf,
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
    },
    /// Print the configured solver and judge models
    Models {
        #[arg(long, default_value = "bench.toml")]
        config: PathBuf,
    },
    /// Remove persisted solutions, critiques, and logs
    Clean {
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run { config, out_dir } => cli::run(&config, &out_dir),
        Command::Models { config } => cli::models(&config),
        Command::Clean { out_dir } => cli::clean(&out_dir),
    }
}

/// Dev diagnostics via `RUST_LOG` to stderr; defaults to `warn`.
/// Product output (the per-run log) is written separately by the run itself.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
