/// Janitor error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JanitorError>;

#[derive(Debug, Error)]
pub enum JanitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} not set. Check your .env file or environment variables.", .0.join(" and "))]
    MissingCredentials(Vec<&'static str>),
}

impl From<config::ConfigError> for JanitorError {
    fn from(err: config::ConfigError) -> Self {
        JanitorError::Config(err.to_string())
    }
}
