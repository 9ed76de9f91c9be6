use std::time::Duration;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransferError>;

/// Errors reported by a transfer session.
///
/// Connection-class failures (`Protocol`, `Timeout`, `AuthenticationFailed`,
/// `KeyFile`, `Connection`) and transfer-class failures (`Transfer`) tear the
/// session down before they are returned; the session is disconnected when
/// the caller sees one of them.
#[derive(Debug, Error)]
pub enum TransferError {
    /// SSH-level protocol failure during connect or a later operation.
    #[error("could not establish SSH connection: {0}")]
    Protocol(String),

    /// The connect attempt exceeded the configured timeout.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),

    /// The server rejected the presented credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The configured private key could not be read or decrypted.
    #[error("key file error: {0}")]
    KeyFile(String),

    /// Connect failure that is neither a protocol error nor a timeout.
    #[error("error connecting to remote: {0}")]
    Connection(String),

    /// A remote path does not exist, or is not the expected kind of entry.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A get, put, or remove on the transport failed mid-operation.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// A local filesystem operation failed.
    #[error("local I/O error: {0}")]
    LocalIo(String),

    /// An operation was invoked on a session with no live connection.
    #[error("session is not connected")]
    NotConnected,
}

// Required by the russh client handler; anything the transport surfaces
// through this path is an SSH protocol failure.
impl From<russh::Error> for TransferError {
    fn from(err: russh::Error) -> Self {
        TransferError::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_path_message_names_the_path() {
        let err = TransferError::InvalidPath("/nonexistent is an invalid directory path".into());
        assert!(err.to_string().contains("/nonexistent"));
    }

    #[test]
    fn timeout_message_carries_the_duration() {
        let err = TransferError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }
}
