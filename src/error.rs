use std::io;
use std::path::PathBuf;

use thiserror::Error;


/// Errors that abort the process before any request is served.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("socket not found at {}; start the backend first", .0.display())]
    SocketNotFound(PathBuf),

    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("logger setup failed: {0}")]
    Logger(String),

    #[error("could not install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Errors of a single proxied request. Every variant ends up as a 502.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The backend answered with something that is not an HTTP response.
    #[error("{0}")]
    Protocol(String),

    #[error("cannot connect to {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        source: io::Error,
    },

    #[error("backend i/o failed: {0}")]
    Backend(io::Error),

    #[error("failed to read request body: {0}")]
    Inbound(io::Error),

    #[error("incomplete request body: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: usize, received: usize },
}

impl ProxyError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        ProxyError::Protocol(msg.into())
    }
}
