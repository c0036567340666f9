//! Debate command - run a moderated debate and render the log
//!
//! Usage:
//! ```bash
//! agora debate --topic "Homework should be banned" --style casual --rounds 2
//! agora debate --config debate.json --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use agora_agents::{DebateAnalytics, DebateStyle, DebateSummary, Speaker};
use agora_llm::{
    HuggingFaceProvider, LlmCircuitConfig, LlmConfig, LlmProvider, MockProvider, ProviderKind,
    ResilientProvider,
};
use agora_runtime::{DebateConfig, DebateOrchestrator, DebateOutcome, EntryKind, LogEntry};
use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use serde_json::json;

/// Arguments for the debate command
#[derive(Args)]
pub struct DebateArgs {
    /// Motion to debate
    #[arg(long, short = 't')]
    topic: Option<String>,

    /// formal, casual or academic
    #[arg(long, short = 's')]
    style: Option<DebateStyle>,

    /// Rebuttal rounds (1-5)
    #[arg(long, short = 'r')]
    rounds: Option<u8>,

    /// Points per argument (1-5)
    #[arg(long, short = 'p')]
    points: Option<u8>,

    /// Skip fact-checking
    #[arg(long)]
    no_fact_check: bool,

    /// Log each debater's chosen approach
    #[arg(long)]
    show_thinking: bool,

    /// JSON file with a debate configuration; flags override it
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the log and analytics as JSON
    #[arg(long)]
    json: bool,
}

/// Run the debate command
pub async fn run(args: DebateArgs) -> Result<()> {
    let config = build_config(&args)?;
    let llm_config = LlmConfig::from_env().context("Failed to load provider configuration")?;
    let policy = llm_config.retry_policy();

    let outcome = match llm_config.provider {
        ProviderKind::Mock => {
            let llm = ResilientProvider::new(MockProvider::smart(), LlmCircuitConfig::conservative(), policy);
            execute(config, llm).await?
        }
        ProviderKind::HuggingFace => {
            let token = llm_config.api_token()?.unwrap_or_default();
            let provider = HuggingFaceProvider::new(token, &llm_config.model);
            let llm = ResilientProvider::new(provider, LlmCircuitConfig::conservative(), policy);
            execute(config, llm).await?
        }
    };

    if args.json {
        let value = json!({
            "log": outcome.log,
            "analytics": outcome.analytics,
            "summary": outcome.summary,
            "completed": outcome.completed,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        render(&outcome);
    }
    Ok(())
}

fn build_config(args: &DebateArgs) -> Result<DebateConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            DebateConfig::from_json(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => DebateConfig::default(),
    };
    if let Some(topic) = &args.topic {
        config.topic = topic.clone();
    }
    if let Some(style) = args.style {
        config.style = style;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(points) = args.points {
        config.points_per_argument = points;
    }
    if args.no_fact_check {
        config.fact_checking = false;
    }
    if args.show_thinking {
        config.show_thinking = true;
    }
    Ok(config)
}

async fn execute<L: LlmProvider + 'static>(config: DebateConfig, llm: L) -> Result<DebateOutcome> {
    tracing::info!(provider = llm.name(), "Provider selected");
    let orchestrator = DebateOrchestrator::new(config, Arc::new(llm))?;

    let stop = orchestrator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            crate::print_warning("Stopping after the current turn...");
            stop.stop();
        }
    });

    Ok(orchestrator.run().await?)
}

fn render(outcome: &DebateOutcome) {
    println!();
    println!("{}", format!("Debate: {}", outcome.state.topic).bold().cyan());
    println!("{}", "═".repeat(60).cyan());

    for entry in outcome.log.iter().filter(|e| e.kind != EntryKind::Analytics) {
        render_entry(entry);
    }

    if let Some(summary) = &outcome.summary {
        render_summary(summary);
    }
    render_analytics(&outcome.analytics);

    if !outcome.completed {
        crate::print_info("Debate stopped before completion; the log above is partial.");
    }
}

fn speaker_label(speaker: Speaker) -> ColoredString {
    match speaker {
        Speaker::Proponent => speaker.as_str().green().bold(),
        Speaker::Opponent => speaker.as_str().red().bold(),
        Speaker::Moderator => speaker.as_str().blue().bold(),
        Speaker::FactChecker => speaker.as_str().yellow().bold(),
    }
}

fn render_entry(entry: &LogEntry) {
    println!();
    println!(
        "{} {} {}",
        format!("[{}]", entry.stage).dimmed(),
        speaker_label(entry.speaker),
        format!("({})", entry.kind.as_str()).dimmed()
    );
    match entry.kind {
        EntryKind::Thinking => println!("  {}", entry.content.italic().dimmed()),
        EntryKind::Intervention => println!("  {}", entry.content.yellow()),
        EntryKind::FactCheck => println!("  {}", entry.content),
        _ => println!("{}", entry.content),
    }
    if entry.kind.is_statement() {
        if let Some(strength) = entry.metadata["strength"].as_f64() {
            println!("  {} {:.2}", "strength:".dimmed(), strength);
        }
        if entry.metadata["argument"]["degraded"] == true {
            println!("  {}", "generation failed; placeholder shown".red());
        }
    }
}

fn render_summary(summary: &DebateSummary) {
    println!();
    println!("{}", "Summary".bold());
    for (title, items) in [
        ("Key points", &summary.key_points),
        ("Evidence", &summary.evidence),
        ("Disagreements", &summary.disagreements),
        ("Consensus", &summary.consensus),
    ] {
        if items.is_empty() {
            continue;
        }
        println!("  {}", title.underline());
        for item in items {
            println!("    {} {}", "•".cyan(), item);
        }
    }
}

fn render_analytics(analytics: &DebateAnalytics) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Duration"), Cell::new(format!("{:.1}s", analytics.duration_secs))]);
    table.add_row(vec![
        Cell::new("Speaker balance"),
        Cell::new(format!("{:.2}", analytics.speaker_balance)),
    ]);
    table.add_row(vec![
        Cell::new("Topic adherence"),
        Cell::new(format!("{:.2}", analytics.topic_adherence)),
    ]);
    for (speaker, secs) in &analytics.speaker_times {
        table.add_row(vec![
            Cell::new(format!("Speaking time ({speaker})")),
            Cell::new(format!("{secs:.0}s")),
        ]);
    }
    table.add_row(vec![
        Cell::new("Interventions"),
        Cell::new(analytics.total_interventions.to_string()),
    ]);
    for (kind, count) in &analytics.intervention_counts {
        table.add_row(vec![Cell::new(format!("  {kind}")), Cell::new(count.to_string())]);
    }
    table.add_row(vec![
        Cell::new("Interruptions"),
        Cell::new(analytics.flow.interruptions.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Inappropriate content"),
        Cell::new(analytics.flow.inappropriate_content.to_string()),
    ]);

    println!();
    println!("{}", "Analytics".bold());
    println!("{table}");
}
