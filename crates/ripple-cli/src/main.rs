//! Ripple CLI - run the compressor/overdrive chain live, on files, or under
//! a timing harness.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(author, version, about = "Compressor and overdrive effects chain", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process live audio until Ctrl+C
    Run(commands::run::RunArgs),

    /// Process a WAV file through the chain
    Process(commands::process::ProcessArgs),

    /// Time per-block processing against the block deadline
    Bench(commands::bench::BenchArgs),

    /// List audio devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Process(args) => commands::process::run(args),
        Commands::Bench(args) => commands::bench::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
