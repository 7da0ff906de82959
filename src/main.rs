use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use applypilot_cli::config::AppConfig;
use applypilot_cli::factory::ChromeSessionFactory;
use applypilot_cli::store::JsonlOutcomeStore;
use applypilot_cli::{build_mapper, jobs};
use applypilot_core_types::JobPosting;
use applypilot_flow::{ApplyPipeline, BatchRunner, FlowPolicy};

#[derive(Parser)]
#[command(name = "applypilot", version, about = "Autonomous job-application agent")]
struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true, default_value = "applypilot.json")]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply to a single posting URL.
    Apply {
        url: String,
        #[arg(long, default_value = "Unknown role")]
        title: String,
        #[arg(long, default_value = "Unknown company")]
        company: String,
        /// Originating board, used for routing ("indeed", "linkedin", ...).
        #[arg(long, default_value = "")]
        source: String,
    },
    /// Apply to every posting listed in a JSON file.
    Batch { jobs: PathBuf },
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = AppConfig::load(&cli.config)?;
    let mut postings = match cli.command {
        Command::Apply {
            url,
            title,
            company,
            source,
        } => vec![JobPosting::new(title, company, url).with_source(source)],
        Command::Batch { jobs } => jobs::load_postings(&jobs)?,
    };

    let policy = FlowPolicy {
        inter_attempt_delay: Duration::from_secs(config.inter_attempt_delay_secs),
        ..FlowPolicy::default()
    };
    let delay = policy.inter_attempt_delay;
    let pipeline = ApplyPipeline::new(build_mapper(&config)).with_policy(policy);
    let factory = ChromeSessionFactory::new(config.session_config());
    let store = JsonlOutcomeStore::new(config.outcomes_path.clone());
    let runner = BatchRunner::new(&pipeline, &factory, &store);

    let outcomes = runner
        .run(&mut postings, &config.application_config(), delay)
        .await;

    for (posting, outcome) in postings.iter().zip(&outcomes) {
        println!(
            "{}",
            serde_json::to_string(&json!({
                "job_id": posting.id,
                "company": posting.company,
                "outcome": outcome,
            }))?
        );
    }
    let applied = outcomes.iter().filter(|outcome| outcome.success).count();
    info!(applied, total = outcomes.len(), "run complete");
    if applied == 0 {
        std::process::exit(1);
    }
    Ok(())
}
