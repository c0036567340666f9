//! Info command - Show version and provider configuration
//!
//! Usage:
//! ```bash
//! agora info
//! ```

use agora_llm::LlmConfig;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs;

/// Run the info command
pub fn run(_args: InfoArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    println!("{}", "agora - moderated agent debates".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!();

    println!("{}", "Roles:".bold());
    println!("  {} Proponent and Opponent debaters", "✓".green());
    println!("  {} Fact verifier with a shared claim cache", "✓".green());
    println!("  {} Moderator with rule monitoring and analytics", "✓".green());
    println!();

    println!("{}", "Provider:".bold());
    match LlmConfig::from_env() {
        Ok(config) => {
            println!("  {} {:?}", "Backend:".dimmed(), config.provider);
            println!("  {} {}", "Model:".dimmed(), config.model);
            println!("  {} {}s", "Timeout:".dimmed(), config.timeout_secs);
            println!("  {} {}", "Attempts:".dimmed(), config.max_retries);
            if let Err(err) = config.api_token() {
                crate::print_warning(&err.to_string());
            }
        }
        Err(err) => crate::print_warning(&format!("Invalid provider configuration: {err}")),
    }
    println!();

    println!("{}", "Environment:".bold());
    for (name, meaning) in [
        ("AGORA_PROVIDER", "mock | huggingface (default mock)"),
        ("HF_API_TOKEN", "Hugging Face token"),
        ("AGORA_MODEL", "model id"),
        ("AGORA_TIMEOUT_SECS", "per-call timeout"),
        ("AGORA_MAX_RETRIES", "attempts per generation call"),
        ("RUST_LOG", "log filter, overrides -v"),
    ] {
        println!("  {} {}", format!("{name}:").dimmed(), meaning);
    }
    println!();

    Ok(())
}
