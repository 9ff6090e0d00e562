// Error handling
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PwoutError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid rule `{rule}`: {message}")]
    Pattern { rule: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, PwoutError>;

// Helper conversions
impl From<config::ConfigError> for PwoutError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for PwoutError {
    fn from(e: serde_json::Error) -> Self { Self::Serialization(e.to_string()) }
}
