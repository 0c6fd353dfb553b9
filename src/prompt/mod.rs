// src/prompt/mod.rs

//! Prompt construction for the host model.
//!
//! The same rules template backs two shapes:
//! - completion style: one string ending in an open `Host:` turn
//! - chat style: role-tagged messages ending in the player's question
//!
//! Everything here is pure; the answer only ever appears in the rules.

pub mod template;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::answers::AnswerEntry;
pub use template::{GameTemplate, TemplateError};

/// Longest guess (in characters) that reaches the model.
pub const MAX_GUESS_CHARS: usize = 50;

const OPENING_QUESTION: &str = "do you know what it is?";
const OPENING_REPLY: &str = "Yes.";
const CHAT_ROLE_NOTE: &str =
    "You are the Host and the user is the Player. Reply with a single line.";

/// Trim, cap at [`MAX_GUESS_CHARS`] characters, flatten line breaks, lowercase.
pub fn normalize_guess(raw: &str) -> String {
    raw.trim()
        .chars()
        .take(MAX_GUESS_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    #[default]
    Completion,
    Chat,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Completion => "completion",
            PromptStyle::Chat => "chat",
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completion" => Ok(PromptStyle::Completion),
            "chat" => Ok(PromptStyle::Chat),
            other => Err(format!(
                "unknown prompt style '{other}' (expected 'completion' or 'chat')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A rendered prompt, in whichever shape the completion endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Completion(String),
    Chat(Vec<ChatMessage>),
}

impl Prompt {
    pub fn style(&self) -> PromptStyle {
        match self {
            Prompt::Completion(_) => PromptStyle::Completion,
            Prompt::Chat(_) => PromptStyle::Chat,
        }
    }

    /// Flattened text for logs.
    pub fn to_log_text(&self) -> String {
        match self {
            Prompt::Completion(text) => text.clone(),
            Prompt::Chat(messages) => messages
                .iter()
                .map(|m| format!("[{:?}] {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    style: PromptStyle,
    template: GameTemplate,
}

impl PromptBuilder {
    pub fn new(style: PromptStyle, template: GameTemplate) -> Self {
        Self { style, template }
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    pub fn build(&self, answer: &AnswerEntry, guess: &str) -> Prompt {
        match self.style {
            PromptStyle::Completion => Prompt::Completion(self.completion_text(answer, guess)),
            PromptStyle::Chat => Prompt::Chat(self.chat_messages(answer, guess)),
        }
    }

    pub fn completion_text(&self, answer: &AnswerEntry, guess: &str) -> String {
        let rules = self.template.render_rules(answer);
        let guess = normalize_guess(guess);
        format!(
            "{rules}\n\nPlayer: {OPENING_QUESTION}\nHost: {OPENING_REPLY}\n\nPlayer: {guess}\nHost:"
        )
    }

    pub fn chat_messages(&self, answer: &AnswerEntry, guess: &str) -> Vec<ChatMessage> {
        let rules = self.template.render_rules(answer);
        vec![
            ChatMessage::new(ChatRole::System, format!("{rules}\n\n{CHAT_ROLE_NOTE}")),
            ChatMessage::new(ChatRole::User, OPENING_QUESTION),
            ChatMessage::new(ChatRole::Assistant, OPENING_REPLY),
            ChatMessage::new(ChatRole::User, normalize_guess(guess)),
        ]
    }
}

/// Completion-style prompt with the default rules.
pub fn build_prompt(answer: &AnswerEntry, guess: &str) -> String {
    PromptBuilder::default().completion_text(answer, guess)
}

/// Chat-style messages with the default rules.
pub fn build_chat_messages(answer: &AnswerEntry, guess: &str) -> Vec<ChatMessage> {
    PromptBuilder::default().chat_messages(answer, guess)
}
