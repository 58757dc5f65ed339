//! Server error types

use std::io;

/// Errors raised while starting the server or handling a connection
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address '{0}'")]
    Address(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Read failed: {0}")]
    Read(#[source] io::Error),

    #[error("Write failed: {0}")]
    Write(#[source] io::Error),
}
