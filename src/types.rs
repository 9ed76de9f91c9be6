use std::path::PathBuf;
use std::time::Duration;

use russh_sftp::protocol::FileType;
use serde::{Deserialize, Serialize};

/// Connect timeout applied when none is configured, matching the default of
/// the tools this crate replaces.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Credentials for the SSH connection.
///
/// Exactly one credential kind is configured; supplying both a key and a
/// password at once is not representable.
#[derive(Clone, Serialize, Deserialize)]
pub enum Auth {
    /// Password authentication.
    Password(String),
    /// Private-key authentication, with an optional passphrase for
    /// encrypted keys.
    Key {
        path: PathBuf,
        passphrase: Option<String>,
    },
}

// Secrets stay out of logs and error chains.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Password(_) => f.debug_tuple("Password").field(&"[REDACTED]").finish(),
            Auth::Key { path, passphrase } => f
                .debug_struct("Key")
                .field("path", path)
                .field("passphrase", &passphrase.as_ref().map(|_| "[REDACTED]"))
                .finish(),
        }
    }
}

/// Connection parameters for a transfer session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hostname or IP address of the remote server.
    pub host: String,
    /// Username for SSH authentication.
    pub username: String,
    /// SSH port, 22 unless overridden.
    #[serde(default = "default_port")]
    pub port: u16,
    /// How the session authenticates.
    pub auth: Auth,
    /// Time allowed for establishing the connection; no other operation is
    /// time-bounded.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl SessionConfig {
    /// Creates a configuration for the default port with the default
    /// connect timeout.
    pub fn new(host: impl Into<String>, username: impl Into<String>, auth: Auth) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            port: default_port(),
            auth,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Classification of a remote entry from a no-follow stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (the link itself, not its target).
    Symlink,
    /// Anything else (device, socket, fifo, unknown).
    Other,
}

impl From<FileType> for RemoteFileKind {
    fn from(file_type: FileType) -> Self {
        match file_type {
            FileType::File => RemoteFileKind::File,
            FileType::Dir => RemoteFileKind::Directory,
            FileType::Symlink => RemoteFileKind::Symlink,
            FileType::Other => RemoteFileKind::Other,
        }
    }
}

/// Options controlling a download or upload call.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    /// Include dotfiles in directory transfers.
    pub copy_hidden: bool,
    /// Copy symlinks that resolve to regular files; when false, symlinks
    /// are skipped outright.
    pub copy_symlinks: bool,
    /// Delete each source file after the transfer completes.
    pub remove_source: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            copy_hidden: true,
            copy_symlinks: true,
            remove_source: false,
        }
    }
}

/// Outcome of a download or upload call.
///
/// `transferred` holds source paths (remote paths for downloads, local paths
/// for uploads) in the order they were copied; it is the list to hand to
/// [`RemoteTransferSession::remove_remote_files`] or
/// [`RemoteTransferSession::remove_local_files`] for deferred cleanup.
///
/// [`RemoteTransferSession::remove_remote_files`]: crate::RemoteTransferSession::remove_remote_files
/// [`RemoteTransferSession::remove_local_files`]: crate::RemoteTransferSession::remove_local_files
#[derive(Debug, Clone, Default)]
pub struct TransferSummary {
    /// Source paths of the files that were copied.
    pub transferred: Vec<String>,
    /// Entry names that were considered and skipped (symlink policy, or
    /// not a regular file). Hidden entries filtered out of the listing do
    /// not appear here.
    pub skipped: Vec<String>,
    /// Whether `remove_source` deleted the sources after the copy.
    pub sources_removed: bool,
}

impl TransferSummary {
    /// Number of files copied by the call.
    pub fn files_copied(&self) -> usize {
        self.transferred.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_port_22_and_5s_timeout() {
        let config = SessionConfig::new("example.com", "user", Auth::Password("pw".into()));
        assert_eq!(config.port, 22);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_overrides_apply() {
        let config = SessionConfig::new("example.com", "user", Auth::Password("pw".into()))
            .with_port(2222)
            .with_connect_timeout(Duration::from_secs(30));
        assert_eq!(config.port, 2222);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_survives_a_serde_round_trip() {
        let config = SessionConfig::new(
            "example.com",
            "user",
            Auth::Key {
                path: PathBuf::from("/home/user/.ssh/id_ed25519"),
                passphrase: None,
            },
        )
        .with_port(2200);

        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, "example.com");
        assert_eq!(back.port, 2200);
        assert!(matches!(back.auth, Auth::Key { .. }));
    }

    #[test]
    fn auth_debug_redacts_secrets() {
        let password = format!("{:?}", Auth::Password("hunter2".into()));
        assert!(!password.contains("hunter2"));

        let key = format!(
            "{:?}",
            Auth::Key {
                path: PathBuf::from("/k"),
                passphrase: Some("hunter2".into()),
            }
        );
        assert!(!key.contains("hunter2"));
    }

    #[test]
    fn transfer_options_default_to_copy_everything() {
        let options = TransferOptions::default();
        assert!(options.copy_hidden);
        assert!(options.copy_symlinks);
        assert!(!options.remove_source);
    }

    #[test]
    fn file_kind_classification_covers_all_types() {
        assert_eq!(RemoteFileKind::from(FileType::File), RemoteFileKind::File);
        assert_eq!(RemoteFileKind::from(FileType::Dir), RemoteFileKind::Directory);
        assert_eq!(RemoteFileKind::from(FileType::Symlink), RemoteFileKind::Symlink);
        assert_eq!(RemoteFileKind::from(FileType::Other), RemoteFileKind::Other);
    }
}
