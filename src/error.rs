//! Error types for compose-resolve

use thiserror::Error;

/// Result type for compose-resolve operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Resolve error kinds
///
/// Each variant maps onto one name reported in the error envelope.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{0}")]
    Argument(String),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Encode(String),
}

impl ResolveError {
    /// Name reported in the `error.name` field of the envelope
    pub fn name(&self) -> &'static str {
        match self {
            ResolveError::Argument(_) => "ArgumentError",
            ResolveError::Config(_) => "ConfigError",
            ResolveError::Parse(_) => "ParseError",
            ResolveError::Encode(_) => "EncodeError",
        }
    }

    /// Message reported in the `error.message` field of the envelope
    pub fn message(&self) -> &str {
        match self {
            ResolveError::Argument(m)
            | ResolveError::Config(m)
            | ResolveError::Parse(m)
            | ResolveError::Encode(m) => m,
        }
    }
}
