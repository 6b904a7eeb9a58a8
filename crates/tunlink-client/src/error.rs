//! Client error types.

use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors produced by the client SDK.
///
/// None of these cross the supervisor's public boundary as panics; the
/// lifecycle operations report them as `false` returns and log the cause.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed connection parameters (empty address or verify key).
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Connection type tag not recognized by this build.
    #[error("Unrecognized connection type: {0:?}")]
    UnknownConnType(String),

    /// The delegated connect did not succeed; transient, subject to
    /// the auto-reconnect policy.
    #[error("Connection error: {0}")]
    Connect(String),

    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
