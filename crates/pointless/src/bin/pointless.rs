//! pointless - estimate story points from the command line.
//!
//! Reads a request as JSON, resolves any Jira references, and prints the
//! scoring backend's decision as JSON.
//!
//! # Environment Variables
//!
//! - `POINTLESS_PROVIDER` - `openai` (default) or `local`
//! - `OPENAI_API_KEY` - required for the `openai` provider
//! - `JIRA_URL`, `JIRA_BASIC_AUTH` / `JIRA_TOKEN` - defaults for Jira locations
//!
//! # Examples
//!
//! ```bash
//! # Score a request file
//! pointless point --request request.json
//!
//! # Offline, from stdin
//! echo '{"story": {"content": "Fix typo"}}' | pointless point --provider local --request -
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pointless::{
    JiraAdapter, JiraConfig, LlmConfig, LlmProvider, PointLessEngineBuilder, PointLessOrchestrator,
    PointLessRequest, SourceRouter, StorySource,
};

/// Estimate story points from reference stories.
#[derive(Parser)]
#[command(name = "pointless")]
#[command(about = "Estimate story points from reference stories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a story
    Point {
        /// Request JSON file, or `-` for stdin
        #[arg(long, short)]
        request: PathBuf,

        /// Scoring provider
        #[arg(long, env = "POINTLESS_PROVIDER")]
        provider: Option<String>,

        /// Model identifier
        #[arg(long, env = "POINTLESS_MODEL")]
        model: Option<String>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn read_request(path: &Path) -> Result<PointLessRequest> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?
    };

    serde_json::from_str(&raw).context("Failed to parse request JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Point {
            request,
            provider,
            model,
            timeout_secs,
        } => {
            let request = read_request(&request)?;

            let mut llm_config = LlmConfig::from_env().context("Invalid LLM configuration")?;
            if let Some(provider) = provider {
                llm_config.provider = provider.parse::<LlmProvider>()?;
            }
            if let Some(model) = model {
                llm_config.model = Some(model);
            }

            let engine = PointLessEngineBuilder::new(llm_config)
                .build()
                .context("Failed to build scoring engine")?;
            let jira = JiraAdapter::new(JiraConfig::from_env())
                .context("Failed to create Jira adapter")?;
            let sources = SourceRouter::new().with_adapter(StorySource::Jira, Arc::new(jira));

            let orchestrator = PointLessOrchestrator::new(Arc::new(engine), Arc::new(sources));
            let pointing = orchestrator.point_story(request);

            let response = match timeout_secs {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), pointing)
                    .await
                    .with_context(|| format!("Timed out after {secs}s"))?,
                None => pointing.await,
            }
            .context("Failed to point story")?;

            tracing::info!(points = response.points, "Pointed story");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
