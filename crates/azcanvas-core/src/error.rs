//! Error types for design sessions and their collaborators

use azcanvas_codegen::CodegenError;
use azcanvas_model::ModelError;
use azcanvas_pipeline::PipelineError;
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Canvas edit rejected
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Document could not be hashed or parsed
    #[error("codegen error: {0}")]
    Codegen(#[from] CodegenError),

    /// Pipeline misuse
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Persistence collaborator failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Token collaborator failed
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Bad configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Services used before `initialize` or after `teardown`
    #[error("services are not running")]
    ServicesNotRunning,
}

impl CanvasError {
    /// Whether the caller may retry the same operation
    ///
    /// Nothing is retried internally.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Unavailable(_)) | Self::Token(TokenError::Unreachable(_))
        )
    }
}

/// Persistence errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No configuration with that id
    #[error("configuration not found: {0}")]
    NotFound(String),

    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored payload could not be encoded or decoded
    #[error("stored configuration is malformed: {0}")]
    Malformed(String),
}

/// Token validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Validation service could not be reached
    #[error("token service unreachable: {0}")]
    Unreachable(String),

    /// Validation service answered with an error status
    #[error("token service returned status {status}")]
    BadStatus {
        /// HTTP status code
        status: u16,
    },

    /// Response body was not a verdict
    #[error("invalid token service response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config schema
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result alias for session operations
pub type Result<T, E = CanvasError> = std::result::Result<T, E>;
