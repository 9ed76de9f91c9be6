// Module declarations
mod auth;
mod error;
mod handler;
mod operations;
mod session;
mod types;
mod utils;

// Public API exports
pub use error::{Result, TransferError};
pub use session::RemoteTransferSession;
pub use types::{
    Auth, DEFAULT_CONNECT_TIMEOUT, RemoteFileKind, SessionConfig, TransferOptions, TransferSummary,
};
