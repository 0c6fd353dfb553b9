// src/config/mod.rs

//! Configuration file support.
//!
//! Values resolve in this order: CLI flag > env var (both via clap) > TOML
//! config file > built-in default. The file is looked up at `--config`, then
//! `./twentyq.toml`, then `~/.twentyq/config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::llm::GenerationParams;
use crate::llm::openai::DEFAULT_BASE_URL;
use crate::prompt::template::{DEFAULT_REPLIES, DEFAULT_RULES, DEFAULT_WIN_REPLY};
use crate::prompt::{GameTemplate, PromptStyle, TemplateError};

pub const LOCAL_CONFIG_FILE: &str = "twentyq.toml";
pub const DEFAULT_ANSWERS_PATH: &str = "things.yaml";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Largest accepted `|day_offset|`, in days.
pub const MAX_DAY_OFFSET: i64 = 1_000_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Raw contents of the TOML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub game: GameSection,
    pub completion: CompletionSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Origins allowed to call with credentials. Empty means any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSection {
    pub answers_path: Option<PathBuf>,
    pub day_offset: Option<i64>,
    pub prompt_style: Option<String>,
    pub replies: Option<Vec<String>>,
    pub win_reply: Option<String>,
    pub rules_template: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionSection {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub stop: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub log_upstream_response: Option<bool>,
    pub default_api_key: Option<String>,
}

impl ConfigFile {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load the first config file found, or defaults when there is none.
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match locate(explicit) {
            Some(path) => Ok((Self::load_from(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::home_dir()
        .map(|h| h.join(".twentyq").join("config.toml"))
        .filter(|p| p.exists())
}

/// Values that come from the command line or the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub answers_path: Option<PathBuf>,
    pub day_offset: Option<i64>,
    pub prompt_style: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub default_api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub params: GenerationParams,
    pub timeout: Duration,
    pub log_upstream_response: bool,
}

/// Fully resolved settings for one process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub answers_path: PathBuf,
    pub day_offset: i64,
    pub prompt_style: PromptStyle,
    pub template: GameTemplate,
    pub completion: CompletionSettings,
    pub default_api_key: Option<String>,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: ConfigFile) -> Result<Self, ConfigError> {
        let ConfigFile {
            server,
            game,
            completion,
        } = file;

        let prompt_style = match overrides.prompt_style.or(game.prompt_style) {
            Some(s) => s.parse::<PromptStyle>().map_err(|reason| ConfigError::Invalid {
                field: "prompt_style",
                reason,
            })?,
            None => PromptStyle::default(),
        };

        let template = GameTemplate::new(
            game.rules_template.unwrap_or_else(|| DEFAULT_RULES.to_string()),
            game.replies
                .unwrap_or_else(|| DEFAULT_REPLIES.iter().map(|r| r.to_string()).collect()),
            game.win_reply.unwrap_or_else(|| DEFAULT_WIN_REPLY.to_string()),
        )?;

        for origin in &server.cors_origins {
            if origin.parse::<axum::http::HeaderValue>().is_err() || origin == "*" {
                return Err(ConfigError::Invalid {
                    field: "cors_origins",
                    reason: format!("'{origin}' is not a usable origin"),
                });
            }
        }

        let timeout_secs = overrides.timeout_secs.or(completion.timeout_secs).unwrap_or(30);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        let day_offset = overrides.day_offset.or(game.day_offset).unwrap_or(0);
        if !(-MAX_DAY_OFFSET..=MAX_DAY_OFFSET).contains(&day_offset) {
            return Err(ConfigError::Invalid {
                field: "day_offset",
                reason: format!("{day_offset} is outside ±{MAX_DAY_OFFSET} days"),
            });
        }

        let defaults = GenerationParams::default();
        let params = GenerationParams {
            temperature: completion.temperature.unwrap_or(defaults.temperature),
            max_tokens: completion.max_tokens.unwrap_or(defaults.max_tokens),
            top_p: completion.top_p.unwrap_or(defaults.top_p),
            frequency_penalty: completion.frequency_penalty.unwrap_or(defaults.frequency_penalty),
            presence_penalty: completion.presence_penalty.unwrap_or(defaults.presence_penalty),
            stop: completion.stop.unwrap_or(defaults.stop),
        };
        if params.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tokens",
                reason: "must be at least 1".to_string(),
            });
        }

        let default_model = match prompt_style {
            PromptStyle::Completion => DEFAULT_COMPLETION_MODEL,
            PromptStyle::Chat => DEFAULT_CHAT_MODEL,
        };
        let model = overrides
            .model
            .or(completion.model)
            .unwrap_or_else(|| default_model.to_string());

        let default_api_key = overrides
            .default_api_key
            .or(completion.default_api_key)
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            host: overrides.host.or(server.host).unwrap_or_else(|| "0.0.0.0".to_string()),
            port: overrides.port.or(server.port).unwrap_or(8000),
            cors_origins: server.cors_origins,
            answers_path: overrides
                .answers_path
                .or(game.answers_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ANSWERS_PATH)),
            day_offset,
            prompt_style,
            template,
            completion: CompletionSettings {
                base_url: overrides
                    .base_url
                    .or(completion.base_url)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model,
                params,
                timeout: Duration::from_secs(timeout_secs),
                log_upstream_response: completion.log_upstream_response.unwrap_or(false),
            },
            default_api_key,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
