// src/lib.rs

pub mod answers;
pub mod config;
pub mod game;
pub mod llm;
pub mod prompt;
pub mod server;
