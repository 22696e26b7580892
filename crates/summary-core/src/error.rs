//! # Summary Error Types
//!
//! Typed error handling for the summary engine.
//! All summary operations return `Result<T, SummaryError>`.

use thiserror::Error;

/// Error type produced by resolver functions.
///
/// Resolvers are user code; whatever they fail with is carried through
/// untouched inside [`SummaryError::Computation`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for all summary operations
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Registry or summary definition is malformed (missing amount, bad key, bad TOML)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Lookup of an extra that was never registered
    #[error("Unknown extra: {key}")]
    UnknownExtra { key: String },

    /// Lookup of a custom computed value that was never registered
    #[error("Unknown computed value: {name}")]
    UnknownValue { name: String },

    /// A resolver function failed while computing `target`
    #[error("Failed to compute {target}: {source}")]
    Computation {
        target: String,
        #[source]
        source: BoxError,
    },

    /// Invalid input data handed to the engine
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SummaryError {
    /// Wrap a resolver failure for the named target (`extra.field` or value name)
    pub fn computation(target: impl Into<String>, source: BoxError) -> Self {
        SummaryError::Computation {
            target: target.into(),
            source,
        }
    }

    /// Summary computation is pure, so nothing is ever worth retrying
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SummaryError::Configuration(_) => 500,
            SummaryError::UnknownExtra { .. } => 404,
            SummaryError::UnknownValue { .. } => 404,
            SummaryError::Computation { .. } => 500,
            SummaryError::InvalidRequest(_) => 400,
        }
    }
}

impl From<toml::de::Error> for SummaryError {
    fn from(err: toml::de::Error) -> Self {
        SummaryError::Configuration(err.to_string())
    }
}

/// Result type alias for summary operations
pub type SummaryResult<T> = Result<T, SummaryError>;
