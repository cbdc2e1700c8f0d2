//! Error types for arbor-vis.

use thiserror::Error;

/// Result type for arbor-vis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or serving the visualizer.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tree input was rejected
    #[error("Invalid tree input: {0}")]
    Parse(#[from] arbor_tree::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
