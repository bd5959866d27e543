// src/generation/mod.rs
pub mod client;
pub mod dispatch;
pub mod models;
pub mod prompts;

pub use client::{ChatClient, TextGenerator};
pub use models::{GenerationConfig, RawReview};
pub use prompts::PromptSet;
