//! agora CLI - run multi-agent debates from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Run a debate with the offline mock provider
//! agora debate --topic "Remote work should be mandatory" --rounds 2
//!
//! # Use Hugging Face and print the log as JSON
//! AGORA_PROVIDER=huggingface HF_API_TOKEN=... agora debate --topic "..." --json
//!
//! # Show version and configuration
//! agora info
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{debate, info};

/// agora - structured debates between autonomous agents
#[derive(Parser)]
#[command(
    name = "agora",
    version,
    about = "agora CLI - moderated, fact-checked agent debates",
    long_about = "agora runs a structured debate between two agents arguing opposite\n\
                  sides of a motion, with a moderator enforcing the rules and a\n\
                  fact-checker scoring every factual claim."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a debate
    #[command(name = "debate")]
    Debate(debate::DebateArgs),

    /// Show version and configuration
    #[command(name = "info")]
    Info(info::InfoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Debate(args) => debate::run(args).await,
        Commands::Info(args) => info::run(args),
    }
}

/// Setup logging based on verbosity level; RUST_LOG takes precedence
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn print_info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), msg);
}
