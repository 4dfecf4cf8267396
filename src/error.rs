//! Error types for sniff2img.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the dump-to-image pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A two-digit slice of a hex payload could not be decoded as a byte.
    #[error("malformed payload in packet {packet} at hex offset {offset}: {fragment:?}")]
    MalformedPayload {
        packet: usize,
        offset: usize,
        fragment: String,
    },

    /// The dump holds fewer packets than the dataset asks for.
    #[error("insufficient packets: found {found}, expected {expected}")]
    InsufficientPackets { found: usize, expected: usize },

    /// The dump could not be opened or is not valid text.
    #[error("unreadable dump {}: {source}", path.display())]
    UnreadableDump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset could not be written to its destination.
    #[error("failed to persist dataset to {}: {source}", path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored artifact does not describe a valid dataset.
    #[error("corrupt dataset artifact: {0}")]
    CorruptArtifact(String),

    /// I/O error outside the dump and artifact paths above
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid image configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
