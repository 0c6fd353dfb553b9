// src/llm/openai.rs

//! OpenAI-compatible completion client.
//!
//! Completion-style prompts go to `{base}/completions`, chat-style prompts to
//! `{base}/chat/completions`. Plain reqwest, bearer auth, one attempt.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Completion, CompletionClient, GenerationParams, UpstreamFailure};
use crate::prompt::{ChatMessage, Prompt};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(flatten)]
    params: &'a GenerationParams,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(flatten)]
    params: &'a GenerationParams,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    params: GenerationParams,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        params: GenerationParams,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            params,
        })
    }

    fn endpoint(&self, prompt: &Prompt) -> String {
        match prompt {
            Prompt::Completion(_) => format!("{}/completions", self.base_url),
            Prompt::Chat(_) => format!("{}/chat/completions", self.base_url),
        }
    }

    fn request_body(&self, prompt: &Prompt) -> serde_json::Result<serde_json::Value> {
        match prompt {
            Prompt::Completion(text) => serde_json::to_value(CompletionRequest {
                model: &self.model,
                prompt: text,
                params: &self.params,
            }),
            Prompt::Chat(messages) => serde_json::to_value(ChatRequest {
                model: &self.model,
                messages,
                params: &self.params,
            }),
        }
    }
}

/// Pull the first choice's text out of a response body, exactly as sent.
pub fn extract_text(prompt: &Prompt, raw: &serde_json::Value) -> Result<String, UpstreamFailure> {
    let text = match prompt {
        Prompt::Completion(_) => {
            let parsed: CompletionResponse = serde_json::from_value(raw.clone())
                .map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;
            parsed.choices.into_iter().next().map(|c| c.text)
        }
        Prompt::Chat(_) => {
            let parsed: ChatResponse = serde_json::from_value(raw.clone())
                .map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;
            parsed.choices.into_iter().next().and_then(|c| c.message.content)
        }
    };

    text.ok_or_else(|| UpstreamFailure::Malformed("response has no choices".to_string()))
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &Prompt,
        api_key: &str,
    ) -> Result<Completion, UpstreamFailure> {
        let url = self.endpoint(prompt);
        let body = self
            .request_body(prompt)
            .map_err(|e| UpstreamFailure::Malformed(format!("could not encode request: {e}")))?;

        debug!(url = %url, model = %self.model, "calling completion service");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamFailure::Status {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;
        let text = extract_text(prompt, &raw)?;

        Ok(Completion { text, raw })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
