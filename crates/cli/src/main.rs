//! `plates` -- generate a printable coloring page or mandala from the
//! command line.
//!
//! Submits one prediction, polls it to completion and prints the asset
//! URL on stdout. Ctrl-C cancels the wait.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default                        | Description                     |
//! |--------------------------|----------|--------------------------------|---------------------------------|
//! | `REPLICATE_API_TOKEN`    | yes      | --                             | Bearer token, read per request  |
//! | `REPLICATE_API_URL`      | no       | `https://api.replicate.com/v1` | Provider base URL               |
//! | `REPLICATE_MODEL_VERSION`| no       | line-art model                 | Model version id                |
//! | `POLL_INTERVAL_MS`       | no       | `1000`                         | Delay between status queries    |
//! | `POLL_MAX_ATTEMPTS`      | no       | --                             | Cap on status queries           |
//! | `POLL_TIMEOUT_SECS`      | no       | `300`                          | Wall-clock cap (0 disables)     |
//! | `POLL_TRANSPORT_RETRIES` | no       | `0`                            | Retries per failed status query |
//! | `POLL_CANCEL_ON_ABORT`   | no       | `true`                         | Cancel the job on timeout/abort |

use anyhow::Context;
use clap::{Parser, Subcommand};
use plates_core::request::{parse_assignment, GenerationRequest, ParamValue, PROMPT_PARAM};
use plates_core::types::GenerationKind;
use plates_replicate::config::{PollConfig, ReplicateConfig, API_TOKEN_VAR};
use plates_replicate::generator::ImageGenerator;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "plates", about = "Generate printable coloring pages and mandalas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Coloring page from a free-text description.
    Coloring {
        /// What the page should show.
        #[arg(long)]
        prompt: String,
        /// Extra questionnaire answer as key=value (repeatable).
        #[arg(long = "answer", value_name = "KEY=VALUE")]
        answers: Vec<String>,
    },
    /// Mandala shaped by mood answers.
    Mandala {
        /// Mood answer as key=value; use `|` for multi-select (repeatable).
        #[arg(long = "answer", value_name = "KEY=VALUE", required = true)]
        answers: Vec<String>,
    },
}

impl Command {
    fn into_request(self) -> anyhow::Result<(GenerationKind, GenerationRequest)> {
        let (kind, prompt, answers) = match self {
            Self::Coloring { prompt, answers } => {
                (GenerationKind::ColoringPlate, Some(prompt), answers)
            }
            Self::Mandala { answers } => (GenerationKind::Mandala, None, answers),
        };

        let mut params = std::collections::BTreeMap::new();
        for raw in &answers {
            let (key, value) = parse_assignment(raw)?;
            params.insert(key, value);
        }
        if let Some(prompt) = prompt {
            params.insert(PROMPT_PARAM.to_string(), ParamValue::Text(prompt));
        }
        Ok((kind, GenerationRequest::new(params)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plates_cli=info,plates_replicate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let (kind, request) = cli.command.into_request()?;

    let replicate = ReplicateConfig::from_env().context("invalid provider configuration")?;
    let poll = PollConfig::from_env().context("invalid polling configuration")?;

    if std::env::var(API_TOKEN_VAR).is_err() {
        tracing::warn!("{API_TOKEN_VAR} is not set; the provider will reject requests");
    }

    tracing::info!(
        kind = %kind,
        api_url = %replicate.api_url,
        interval_ms = poll.interval.as_millis() as u64,
        "Starting generation",
    );

    let generator = ImageGenerator::replicate(&replicate, poll)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            on_ctrl_c.cancel();
        }
    });

    let url = generator
        .generate(kind, &request, &cancel)
        .await
        .context("Failed to generate image. Please try again.")?;

    println!("{url}");
    Ok(())
}
