// src/utils/error.rs
use thiserror::Error;

/// Misconfigured section tables. This is the only failure the extractor
/// itself can produce; malformed input text never ends up here.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Invalid boundary pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Empty boundary marker for section: {0}")]
    EmptyMarker(String),

    #[error("Section declared twice: {0}")]
    DuplicateSection(String),

    #[error("Section '{0}' cannot start at end of text")]
    StartAtEndOfText(String),

    #[error("Section specification has no rules")]
    EmptySpec,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Generation service rate limit exceeded")]
    RateLimited,

    #[error("Generation service rejected the API key")]
    Unauthorized,

    #[error("Missing API key (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Failed to parse generation response: {0}")]
    Parse(String),

    #[error("Generation service returned empty content")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Invalid section specification: {0}")]
    Spec(#[from] SpecError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
