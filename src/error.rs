use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("HTTP error: {0}")]
    #[diagnostic(code(kalenteri::http))]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(kalenteri::api))]
    Api { status: u16, message: String },

    #[error("Session expired or invalid, please log in again")]
    #[diagnostic(code(kalenteri::unauthorized), help("run `kalenteri login`"))]
    Unauthorized,

    #[error("Validation error: {0}")]
    #[diagnostic(code(kalenteri::validation))]
    Validation(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(kalenteri::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(kalenteri::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(kalenteri::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(kalenteri::serialization))]
    Serialization(String),

    #[error("Query cache error: {0}")]
    #[diagnostic(code(kalenteri::query))]
    Query(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(kalenteri::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("Invalid URL: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type CalResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create query cache errors
pub fn query_error(message: &str) -> Error {
    Error::Query(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
