//! Concierge CLI - Command-line interface
//!
//! Usage:
//!   concierge ask <question> --guide guide.json [--lang en] [--suite 313]
//!   concierge excerpts <question> --guide guide.json [--prompt]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use concierge_core::{AppConfig, ConciergeRequest, GuideDocument, Suite};
use concierge_rag::QueryResponder;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Digital concierge for the vacation rental guide")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still apply)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a guest question using the completion API
    Ask {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show the excerpts that would be sent, without calling the API
    Excerpts {
        #[command(flatten)]
        query: QueryArgs,

        /// Also print the assembled system and user prompts
        #[arg(long)]
        prompt: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Guest question
    question: String,

    /// Guide document (JSON, keyed by language code)
    #[arg(short, long)]
    guide: PathBuf,

    /// Answer language
    #[arg(short, long, default_value = "he")]
    lang: String,

    /// Room identifier (313 or 413)
    #[arg(short, long)]
    suite: Option<Suite>,
}

impl QueryArgs {
    fn to_request(&self) -> anyhow::Result<ConciergeRequest> {
        Ok(ConciergeRequest::new(self.question.as_str())
            .with_lang(self.lang.as_str())
            .with_suite(self.suite)
            .with_content(load_guide(&self.guide)?))
    }
}

/// Read a guide document from disk
fn load_guide(path: &Path) -> anyhow::Result<GuideDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read guide {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("guide {} is not valid JSON", path.display()))?;
    Ok(GuideDocument::from(value))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "concierge_rag=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let responder = QueryResponder::from_config(&config)?;

    match cli.command {
        Commands::Ask { query } => {
            let request = query.to_request()?;
            let response = responder.respond(&request).await?;
            println!("{}", response.answer);
            eprintln!("({} matching excerpts)", response.debug.matched);
        }
        Commands::Excerpts { query, prompt } => {
            let request = query.to_request()?;
            let prepared = responder.prepare(&request)?;

            println!(
                "{} of {} snippets matched",
                prepared.retrieval.matched(),
                prepared.retrieval.candidates
            );
            for scored in &prepared.retrieval.ranked {
                println!("  score {:>3}  ({})", scored.score, scored.tag());
            }
            println!();
            println!("{}", prepared.retrieval.context);

            if prompt {
                println!("\n--- system ---\n{}", prepared.prompt.system);
                println!("\n--- user ---\n{}", prepared.prompt.user);
            }
        }
    }

    Ok(())
}
