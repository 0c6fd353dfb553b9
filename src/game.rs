// src/game.rs

//! Process-wide, read-only game setup: the answer list, the day offset, and
//! the prompt builder. Shared between requests behind an `Arc`.

use chrono::{DateTime, Utc};

use crate::answers::{self, AnswerBook, AnswerEntry};
use crate::prompt::{Prompt, PromptBuilder};

#[derive(Debug, Clone)]
pub struct Game {
    answers: AnswerBook,
    day_offset: i64,
    prompts: PromptBuilder,
}

impl Game {
    pub fn new(answers: AnswerBook, day_offset: i64, prompts: PromptBuilder) -> Self {
        Self {
            answers,
            day_offset,
            prompts,
        }
    }

    pub fn answers(&self) -> &AnswerBook {
        &self.answers
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    pub fn todays_answer(&self, now: DateTime<Utc>) -> &AnswerEntry {
        answers::select_daily_answer(&self.answers, now, self.day_offset)
    }

    pub fn prompt_for(&self, answer: &AnswerEntry, guess: &str) -> Prompt {
        self.prompts.build(answer, guess)
    }
}
