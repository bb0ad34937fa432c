//! CLI error types and exit codes

use crate::config::ConfigError;
use stocksync_client::ClientError;
use stocksync_engine::RunFailure;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success (individual operation failures included)
/// - 1: Synchronization run failed
/// - 2: Configuration or input error
/// - 3: Network error
/// - 4: I/O error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Synchronization failed: {0}")]
    RunFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::RunFailed(_) => 1,
            CliError::Config(_) | CliError::Validation(_) => 2,
            CliError::Network(_) => 3,
            CliError::Io(_) | CliError::Logging(_) => 4,
        }
    }

    /// Print the error to stderr.
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            eprintln!("\nSuggestion: {suggestion}");
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => {
                Some("Check stocksync.toml (see stocksync.example.toml) or pass --config.")
            }
            CliError::Network(_) => Some("Check the service URLs and your network connection."),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::InvalidConfig(message) => CliError::Config(message),
            other => CliError::Network(other.to_string()),
        }
    }
}

impl From<RunFailure> for CliError {
    fn from(failure: RunFailure) -> Self {
        CliError::RunFailed(failure.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Io(format!("JSON encoding failed: {err}"))
    }
}
