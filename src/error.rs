//! Error types shared by the collector, converter and client.

use thiserror::Error;

use crate::convert::ConvertError;
use crate::core::graph::GraphError;

/// A specialized `Result` type for archflow operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The graph description failed validation.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// The diagram could not be converted.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching from the collector failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The collector could not bind or serve.
    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (Error::transport("connection refused"), "Transport error: connection refused"),
            (Error::server("bind failed"), "Server error: bind failed"),
            (Error::config("speed must be positive"), "Configuration error: speed must be positive"),
            (
                Error::Graph(GraphError::DuplicateNode("A".into())),
                "Graph error: duplicate node id \"A\"",
            ),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "objects.json");
        let error: Error = io_err.into();
        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("not json");
        let error: Error = json_result.unwrap_err().into();
        assert!(matches!(error, Error::Serialization(_)));
    }
}
