use std::{io, net::SocketAddr};

use thiserror::Error;

/// Failures of the local hosting bridge.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The local web server could not bind or read back its listening address.
    #[error("failed to bind local web server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to create window '{label}': {reason}")]
    WindowCreate { label: String, reason: String },

    /// The window could not be pointed at the local server.
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ShellError>;
