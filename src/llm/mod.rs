// src/llm/mod.rs

//! Completion service seam.
//!
//! The handler only talks to [`CompletionClient`]; the OpenAI-compatible
//! implementation lives in [`openai`].

pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::prompt::Prompt;

pub use openai::OpenAiClient;

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 100,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: vec!["\n".to_string()],
        }
    }
}

/// First choice of a completion plus the raw body it came from.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub raw: serde_json::Value,
}

/// Anything that went wrong talking to the completion service.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    #[error("no API key in request and no default key configured")]
    MissingCredential,

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt, api_key: &str) -> Result<Completion, UpstreamFailure>;

    /// Model name, for startup logs.
    fn model(&self) -> &str;
}
