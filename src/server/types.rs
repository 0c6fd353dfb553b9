// src/server/types.rs

use serde::{Deserialize, Serialize};

use crate::llm::{Completion, UpstreamFailure};

/// Reply text used whenever the completion service fails.
pub const APOLOGY: &str = "Oops, something went wrong, please take a deep breath, and try again.";

/// Body of `POST /guess`.
#[derive(Debug, Clone, Deserialize)]
pub struct GuessRequest {
    pub text: String,
    /// Caller-supplied API key; older clients send it as `apikey`.
    #[serde(default, alias = "apikey")]
    pub openai_key: Option<String>,
}

impl GuessRequest {
    pub fn api_key(&self) -> Option<&str> {
        self.openai_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub text: String,
}

impl GuessResponse {
    pub fn from_outcome(outcome: &Result<Completion, UpstreamFailure>) -> Self {
        let text = match outcome {
            Ok(completion) => completion.text.clone(),
            Err(_) => APOLOGY.to_string(),
        };
        Self { text }
    }
}
