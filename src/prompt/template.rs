// src/prompt/template.rs

//! Game-rules template with named `{slot}` placeholders.
//!
//! Known slots: `{answer}`, `{quoted_answer}`, `{facts}`, `{replies}`,
//! `{win_reply}`. Substitution is a single left-to-right pass, so slot-like
//! text inside an answer or fact is copied verbatim, never expanded.

use thiserror::Error;

use crate::answers::AnswerEntry;

pub const DEFAULT_RULES: &str = r#"Host and Player are playing a Twenty-Questions quiz game.
Here are the rules:
- The Player asks questions, to guess the Answer.
- The Host responds to questions about the Answer.
- The Host only responds with {replies}.
- The Host responds with "{win_reply}" if the Player guesses {answer}.
- The Answer is {answer}.
{facts}- The Host answers questions about {quoted_answer} in general.
- The Host doesn't utter the Answer {quoted_answer} ever."#;

pub const DEFAULT_REPLIES: [&str; 3] = ["yes", "no", "maybe"];
pub const DEFAULT_WIN_REPLY: &str = "correct, well done!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("rules template must contain the {{answer}} slot")]
    MissingAnswerSlot,

    #[error("reply vocabulary must not be empty")]
    NoReplies,
}

#[derive(Debug, Clone)]
pub struct GameTemplate {
    rules: String,
    replies: Vec<String>,
    win_reply: String,
}

impl Default for GameTemplate {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_string(),
            replies: DEFAULT_REPLIES.iter().map(|r| r.to_string()).collect(),
            win_reply: DEFAULT_WIN_REPLY.to_string(),
        }
    }
}

impl GameTemplate {
    pub fn new(
        rules: impl Into<String>,
        replies: Vec<String>,
        win_reply: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        let rules = rules.into();
        if !rules.contains("{answer}") {
            return Err(TemplateError::MissingAnswerSlot);
        }
        if replies.iter().all(|r| r.trim().is_empty()) {
            return Err(TemplateError::NoReplies);
        }
        Ok(Self {
            rules,
            replies,
            win_reply: win_reply.into(),
        })
    }

    pub fn win_reply(&self) -> &str {
        &self.win_reply
    }

    /// Render the rule statement for `answer`. This is the only place the
    /// answer is written into a prompt.
    pub fn render_rules(&self, answer: &AnswerEntry) -> String {
        let replies = self
            .replies
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| format!("\"{}\"", r))
            .collect::<Vec<_>>()
            .join(", ");
        let facts = render_facts(&answer.facts);
        let quoted = quote(&answer.answer);

        render_slots(
            &self.rules,
            &[
                ("answer", answer.answer.as_str()),
                ("quoted_answer", quoted.as_str()),
                ("facts", facts.as_str()),
                ("replies", replies.as_str()),
                ("win_reply", self.win_reply.as_str()),
            ],
        )
    }
}

fn render_facts(facts: &[String]) -> String {
    if facts.is_empty() {
        return String::new();
    }
    let mut out = String::from("- Here are some facts about the Answer:\n");
    for fact in facts {
        out.push_str("  * ");
        out.push_str(fact);
        out.push('\n');
    }
    out
}

/// Single-quote `s`, switching to double quotes when it contains an apostrophe.
pub fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s)
    }
}

/// Replace each `{name}` with its value. Unknown slots stay as written.
pub fn render_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .map(|close| (&after[..close], close))
            .and_then(|(name, close)| {
                slots
                    .iter()
                    .find(|(slot, _)| *slot == name)
                    .map(|(_, value)| (*value, close))
            });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
