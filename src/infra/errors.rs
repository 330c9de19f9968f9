// src/infra/errors.rs - Error types for esgsim

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsgError {
    // Collaborator errors (recovered locally by the core)
    #[error("Provider '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Rate limited by '{provider}', retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: u64,
    },

    #[error("Data source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Unparseable score from '{provider}': {reply:?}")]
    UnparseableScore { provider: String, reply: String },

    // Contract violations
    #[error("No round has completed yet; call step() before querying scores")]
    NoRoundCompleted,

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),

    // Malformed provider payloads
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EsgError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            EsgError::Provider {
                retriable: true,
                ..
            } | EsgError::RateLimited { .. }
        )
    }

    pub(crate) fn source_failure(name: &str, message: impl std::fmt::Display) -> Self {
        EsgError::Source {
            source_name: name.to_string(),
            message: message.to_string(),
        }
    }
}
