//! Error types for topic_corpus.
//!
//! Only [`Error`] ever reaches a caller. Fetch failures ([`crate::fetchers::FetchError`])
//! are absorbed inside the per-source pipelines and aggregation failures
//! ([`crate::aggregate::AggregateError`]) are turned into a job's failure reason.

use thiserror::Error;

use crate::models::JobId;

/// Result type alias for topic_corpus operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for topic_corpus
#[derive(Debug, Error)]
pub enum Error {
    /// No job was ever submitted under this id (or it was evicted).
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Invalid configuration value
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML configuration parse error
    #[error("config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_job_not_found_message_includes_id() {
        let id = Uuid::nil();
        let err = Error::JobNotFound(id);
        assert_eq!(
            err.to_string(),
            "job not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_config_error_message() {
        let err = Error::config("max_concurrent_jobs must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error: max_concurrent_jobs must be at least 1"
        );
    }
}
