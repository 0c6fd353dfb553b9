// src/answers/daily.rs

//! Deterministic "answer of the day".
//!
//! The day index seeds a fresh ChaCha generator on every call, so every
//! process serving the same list with the same offset agrees on the answer
//! without sharing any state.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{AnswerBook, AnswerEntry};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days since the Unix epoch, shifted by the deployment's offset.
/// Saturates instead of overflowing on absurd offsets.
pub fn day_index(now: DateTime<Utc>, day_offset: i64) -> i64 {
    now.timestamp().div_euclid(SECONDS_PER_DAY).saturating_add(day_offset)
}

/// Uniform index in `0..n` derived only from `seed`. `None` when `n == 0`.
pub fn seeded_choice(seed: i64, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    Some(rng.random_range(0..n))
}

pub fn select_daily_answer(book: &AnswerBook, now: DateTime<Utc>, day_offset: i64) -> &AnswerEntry {
    let entries = book.entries();
    // AnswerBook guarantees at least one entry
    let idx = seeded_choice(day_index(now, day_offset), entries.len()).unwrap_or(0);
    &entries[idx]
}
