//! Error types for the sourcing co-pilot.

use uuid::Uuid;

/// Top-level error type for the co-pilot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Candidate/job repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Job {id} not found")]
    JobNotFound { id: String },
}

/// Errors raised while interpreting panel input.
///
/// None of these reach the chat log or leave the controller; it logs them
/// and answers with a re-prompt instead.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Unknown outreach channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown candidate source: {0}")]
    UnknownSource(String),

    #[error("Rule {id} not found")]
    RuleNotFound { id: Uuid },

    #[error("No rule at position {position}")]
    RuleNotFoundAt { position: usize },

    #[error("Mode {mode} requires at least one candidate")]
    NoCandidates { mode: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to render message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}

/// Result type alias for the co-pilot.
pub type Result<T> = std::result::Result<T, Error>;
