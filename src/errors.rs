// Error types shared across the library
//
// Persistence code returns anyhow::Result; these enums cover the places where
// callers need to tell failure kinds apart (theme codec, config, backend).

use thiserror::Error;

/// Color scheme encode/decode failures
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("failed to encode color scheme: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode color scheme: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid hex color '{0}'")]
    InvalidColor(String),

    #[error("unknown color scheme preset '{0}'")]
    UnknownPreset(String),
}

/// Challenge field validation failures
#[derive(Error, Debug, PartialEq)]
pub enum ChallengeError {
    #[error("goal amount must be a positive number, got {0}")]
    InvalidGoal(f64),
}

/// Startup configuration failures (fail fast, never run with placeholder credentials)
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    #[error("invalid backend url '{0}': expected http:// or https://")]
    InvalidUrl(String),

    #[error("production backend url must use https: '{0}'")]
    InsecureUrl(String),

    #[error("unknown environment '{0}' (expected development or production)")]
    UnknownEnvironment(String),

    #[error("could not read config file: {0}")]
    Io(String),

    #[error("could not parse config file: {0}")]
    Parse(String),
}

/// Backend client failures
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Request(err.to_string())
    }
}
