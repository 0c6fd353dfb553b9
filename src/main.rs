// src/main.rs

//! twentyq - daily Twenty Questions backend
//!
//! Picks today's answer from a YAML list, asks an LLM to play the host, and
//! serves the host's replies over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use twentyq::answers::AnswerBook;
use twentyq::config::{ConfigFile, Overrides, Settings};
use twentyq::game::Game;
use twentyq::llm::{CompletionClient, OpenAiClient};
use twentyq::prompt::PromptBuilder;
use twentyq::server::{self, AppState};

#[derive(Parser)]
#[command(name = "twentyq")]
#[command(about = "Daily Twenty Questions backend")]
struct Args {
    /// Config file (default: ./twentyq.toml, then ~/.twentyq/config.toml)
    #[arg(long, short = 'c', env = "TWENTYQ_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TWENTYQ_HOST")]
    host: Option<String>,

    /// Port to listen on (default: 8000)
    #[arg(long, short = 'p', env = "TWENTYQ_PORT")]
    port: Option<u16>,

    /// YAML answer list (default: things.yaml)
    #[arg(long, env = "TWENTYQ_ANSWERS")]
    answers: Option<PathBuf>,

    /// Days added to the day index before picking the answer
    #[arg(long, env = "TWENTYQ_DAY_OFFSET", allow_hyphen_values = true)]
    day_offset: Option<i64>,

    /// Prompt shape: completion or chat
    #[arg(long, env = "TWENTYQ_PROMPT_STYLE")]
    prompt_style: Option<String>,

    /// Model name sent to the completion service
    #[arg(long, env = "TWENTYQ_MODEL")]
    model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// API key used when a request brings none
    #[arg(long, env = "DEFAULT_OPENAI_API_KEY", hide_env_values = true)]
    default_api_key: Option<String>,

    /// Upstream request timeout in seconds (default: 30)
    #[arg(long, env = "TWENTYQ_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl From<Args> for Overrides {
    fn from(args: Args) -> Self {
        Overrides {
            host: args.host,
            port: args.port,
            answers_path: args.answers,
            day_offset: args.day_offset,
            prompt_style: args.prompt_style,
            model: args.model,
            base_url: args.base_url,
            default_api_key: args.default_api_key,
            timeout_secs: args.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = Args::parse();
    let config_path = args.config.take();

    let (file, loaded_from) = ConfigFile::load(config_path.as_deref())?;
    if let Some(path) = &loaded_from {
        info!("Loaded config from {}", path.display());
    }
    let settings = Settings::resolve(args.into(), file)?;

    // No answers, no game: refuse to start
    let answers = AnswerBook::load(&settings.answers_path).with_context(|| {
        format!(
            "cannot start without answers from {}",
            settings.answers_path.display()
        )
    })?;

    let completion = OpenAiClient::new(
        settings.completion.base_url.clone(),
        settings.completion.model.clone(),
        settings.completion.params.clone(),
        settings.completion.timeout,
    )?;

    info!(
        answers = answers.len(),
        day_offset = settings.day_offset,
        prompt_style = %settings.prompt_style,
        model = %completion.model(),
        default_key = settings.default_api_key.is_some(),
        "Starting twentyq"
    );

    let game = Game::new(
        answers,
        settings.day_offset,
        PromptBuilder::new(settings.prompt_style, settings.template.clone()),
    );

    let state = AppState {
        game: Arc::new(game),
        completion: Arc::new(completion),
        default_api_key: settings.default_api_key.clone(),
        log_upstream_response: settings.completion.log_upstream_response,
    };

    server::run(&settings.bind_address(), state, &settings.cors_origins).await
}
