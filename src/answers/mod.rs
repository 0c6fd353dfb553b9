// src/answers/mod.rs

//! The answer list: every word the game can pick as "today's answer".
//!
//! Loaded once at startup from a YAML document shaped like
//!
//! ```yaml
//! answers:
//!   - answer: banana
//!     facts:
//!       - it is a fruit
//!   - answer: lighthouse
//! ```
//!
//! An [`AnswerBook`] is never empty, so picking from it cannot fail later.

pub mod daily;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use daily::{day_index, seeded_choice, select_daily_answer};

/// One possible answer plus optional hint facts for the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerEntry {
    pub answer: String,
    #[serde(default)]
    pub facts: Vec<String>,
}

impl AnswerEntry {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            facts: Vec::new(),
        }
    }

    pub fn with_facts<I, S>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facts = facts.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct AnswerFile {
    #[serde(default)]
    answers: Vec<AnswerEntry>,
}

#[derive(Debug, Error)]
pub enum AnswerBookError {
    #[error("failed to read answer list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed answer list: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("answer list is empty")]
    Empty,

    #[error("answer #{index} is blank")]
    BlankAnswer { index: usize },
}

/// Validated, non-empty, immutable list of answers.
#[derive(Debug, Clone)]
pub struct AnswerBook {
    entries: Vec<AnswerEntry>,
}

impl AnswerBook {
    pub fn new(entries: Vec<AnswerEntry>) -> Result<Self, AnswerBookError> {
        if entries.is_empty() {
            return Err(AnswerBookError::Empty);
        }
        if let Some(index) = entries.iter().position(|e| e.answer.trim().is_empty()) {
            return Err(AnswerBookError::BlankAnswer { index });
        }
        Ok(Self { entries })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, AnswerBookError> {
        let file: AnswerFile = serde_yaml::from_str(yaml)?;
        Self::new(file.answers)
    }

    /// Load and validate the answer list at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnswerBookError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AnswerBookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn entries(&self) -> &[AnswerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed book.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
