use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod session;

#[derive(Parser)]
#[command(name = "avsc-probe", about = "Bind the installed AviSynth+ C API and report what resolved")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire the API from a fresh script environment and report the table
    Check(commands::check::CheckArgs),
    /// List the entry points the loader knows about
    Symbols(commands::symbols::SymbolsArgs),
    /// Show loader and interface versions
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Symbols(args) => commands::symbols::run(args),
        Commands::Info => commands::info::run(),
    }
}
