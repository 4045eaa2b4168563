/*!
 * Error types for the novelscene application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Capability failures (translation, classification, exercise generation) are
 * fatal for the ingestion in progress. Malformed payloads are not errors at all:
 * they are discarded locally and reported through `ProposalRejection` and
 * `ExerciseRejection` values.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that abort an ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// The translation capability failed
    #[error("Translation failed: {0}")]
    Translation(#[source] ProviderError),

    /// The scene boundary classifier failed on a chunk
    #[error("Scene classification failed on chunk {chunk_index}: {source}")]
    Classification {
        /// Zero-based chunk index
        chunk_index: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// Vocabulary or question generation failed for a scene
    #[error("Exercise generation failed for scene {scene_index}: {source}")]
    Exercise {
        /// One-based scene index
        scene_index: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the ingestion pipeline
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// Error from the storage layer
    #[error("Database error: {0}")]
    Database(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}
