/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider API
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
        message: String
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

    /// Returned line count does not match the requested line count
    #[error("Line count mismatch: sent {sent}, received {received}")]
    LineCountMismatch {
        /// Number of lines sent to the provider
        sent: usize,
        /// Number of lines received back
        received: usize
    },
}

/// Errors that can occur during subtitle file processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Input file could not be read
    #[error("Failed to read subtitle file {path}: {message}")]
    ReadFailed {
        /// Path of the file
        path: String,
        /// Underlying error message
        message: String
    },

    /// Content could not be parsed as SRT
    #[error("Failed to parse SRT content: {0}")]
    ParseFailed(String),
}

/// Errors produced by the job orchestrator.
/// Cancellation is a job status, not an error.
#[derive(Error, Debug)]
pub enum JobError {
    /// Referenced job does not exist in the registry
    #[error("Job not found: {0}")]
    NotFound(String),
}
