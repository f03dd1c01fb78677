//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use placetrie::config::ConfigFileError;
use placetrie::shard::ShardError;
use placetrie::transport::TransportError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(String),
    /// Failed to create the HTTP transport
    Transport(TransportError),
    /// Failed to read a shard file or directory
    FileRead { path: String, error: std::io::Error },
    /// Shard file failed to decode
    Decode { path: String, error: ShardError },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        if let CliError::Decode { .. } = self {
            eprintln!();
            eprintln!("The file may be an unsupported shard version, or not a");
            eprintln!("shard at all. Run 'placetrie stats <file>' on a known-good");
            eprintln!("shard to compare.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Transport(e) => write!(f, "Failed to create transport: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read '{}': {}", path, error)
            }
            CliError::Decode { path, error } => {
                write!(f, "Failed to decode '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Transport(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Decode { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
