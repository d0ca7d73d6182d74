//! Error types for the Hark framework.

use thiserror::Error;

/// Errors raised while registering routes.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// The route pattern is not a valid regular expression.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// No binding of the requested type exists in the context.
    #[error("no '{0}' bound in context")]
    Missing(&'static str),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
