use std::path::Path;
use std::sync::Arc;

use russh::Disconnect;
use russh::client;
use russh_sftp::client::SftpSession;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::auth::ResolvedAuth;
use crate::error::{Result, TransferError};
use crate::handler::ClientHandler;
use crate::operations::{download, list, upload};
use crate::types::{RemoteFileKind, SessionConfig, TransferOptions, TransferSummary};

/// Live transport state: the SSH connection and the SFTP channel opened on
/// it. Bundling both means the SFTP handle cannot outlive the connection.
struct Link {
    handle: client::Handle<ClientHandler>,
    sftp: SftpSession,
}

/// Directory-aware file-transfer session against one remote host.
///
/// A session is either disconnected or connected; it starts disconnected,
/// [`connect`] moves it to connected, and [`disconnect`] (or any failure
/// during a listing or transfer) moves it back. Operations invoked while
/// disconnected return [`TransferError::NotConnected`].
///
/// [`connect`]: RemoteTransferSession::connect
/// [`disconnect`]: RemoteTransferSession::disconnect
///
/// # Example
///
/// ```ignore
/// let config = SessionConfig::new("example.com", "user", Auth::Password("pw".into()));
/// let mut session = RemoteTransferSession::new(config);
/// session.connect().await?;
/// let summary = session
///     .download("/data", Path::new("/tmp/out"), TransferOptions::default())
///     .await?;
/// println!("downloaded {} files", summary.files_copied());
/// session.disconnect().await;
/// ```
pub struct RemoteTransferSession {
    config: SessionConfig,
    link: Option<Link>,
}

impl RemoteTransferSession {
    /// Creates a disconnected session from connection parameters.
    pub fn new(config: SessionConfig) -> Self {
        Self { config, link: None }
    }

    /// Hostname this session is configured for.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Whether the session currently holds a live connection.
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Establishes the SSH connection and opens the SFTP subsystem over it.
    ///
    /// The TCP connect, SSH handshake, authentication, and subsystem setup
    /// each run under the configured connect timeout. Reconnecting an
    /// already connected session replaces the previous link.
    ///
    /// # Errors
    ///
    /// Classified as [`TransferError::Timeout`], [`TransferError::Protocol`]
    /// (handshake or channel failure), [`TransferError::AuthenticationFailed`],
    /// [`TransferError::KeyFile`], or [`TransferError::Connection`] for
    /// anything else. On failure the session is torn down and left
    /// disconnected.
    pub async fn connect(&mut self) -> Result<()> {
        self.disconnect().await;
        let established = self.establish().await;
        match established {
            Ok(link) => {
                self.link = Some(link);
                info!(host = %self.config.host, "connected to remote");
                Ok(())
            }
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    async fn establish(&self) -> Result<Link> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let stream = timeout(self.config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| TransferError::Timeout(self.config.connect_timeout))?
            .map_err(|e| TransferError::Connection(format!("failed to reach {addr}: {e}")))?;

        // Handshake, auth, and subsystem setup run under the same timeout
        // as the TCP connect.
        timeout(self.config.connect_timeout, self.handshake(stream))
            .await
            .map_err(|_| TransferError::Timeout(self.config.connect_timeout))?
    }

    async fn handshake(&self, stream: TcpStream) -> Result<Link> {
        let ssh_config = Arc::new(client::Config::default());
        let mut handle =
            client::connect_stream(ssh_config, stream, ClientHandler::default()).await?;

        let auth = ResolvedAuth::resolve(&self.config.auth)?;
        let method = auth.method_name();
        let auth_result = match auth {
            ResolvedAuth::Password(password) => {
                handle
                    .authenticate_password(&self.config.username, &password)
                    .await?
            }
            ResolvedAuth::Key(key) => {
                handle
                    .authenticate_publickey(&self.config.username, key)
                    .await?
            }
        };
        if !auth_result.success() {
            return Err(TransferError::AuthenticationFailed(format!(
                "server rejected {method} authentication for user {}",
                self.config.username
            )));
        }

        let channel = handle.channel_open_session().await?;
        channel.request_subsystem(false, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await.map_err(|e| {
            TransferError::Protocol(format!("failed to initialize SFTP subsystem: {e}"))
        })?;

        Ok(Link { handle, sftp })
    }

    /// Closes the SFTP channel and the SSH connection.
    ///
    /// Idempotent and infallible: teardown errors are logged, and calling
    /// this on a disconnected (or never-connected) session does nothing.
    pub async fn disconnect(&mut self) {
        match self.link.take() {
            Some(link) => {
                // Dropping the SFTP session tears down its channel; the SSH
                // disconnect below is best-effort.
                drop(link.sftp);
                if let Err(e) = link
                    .handle
                    .disconnect(Disconnect::ByApplication, "session closed", "en")
                    .await
                {
                    warn!(error = %e, "error while closing SSH connection");
                }
                info!(host = %self.config.host, "disconnected from remote");
            }
            None => debug!("disconnect called on a session that is not connected"),
        }
    }

    /// Lists entry names in a remote directory, one level deep.
    ///
    /// With `show_hidden` false, dotfiles are filtered out. On failure the
    /// session disconnects before the error is returned.
    pub async fn list_directory(
        &mut self,
        remote_path: &str,
        show_hidden: bool,
    ) -> Result<Vec<String>> {
        let listed = list::list_directory(self, remote_path, show_hidden).await;
        match listed {
            Ok(names) => Ok(names),
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    /// Downloads a remote file, or every eligible file in a remote
    /// directory, into an existing local directory.
    ///
    /// See [`TransferOptions`] for the filtering and removal switches. The
    /// returned [`TransferSummary`] records the remote path of every file
    /// copied, in order. On failure the session disconnects before the
    /// error is returned; partial transfers are not rolled back.
    pub async fn download(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        options: TransferOptions,
    ) -> Result<TransferSummary> {
        let downloaded = download::download(self, remote_path, local_path, options).await;
        match downloaded {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    /// Uploads a local file, or every eligible file in a local directory,
    /// into an existing remote directory.
    ///
    /// The mirror of [`download`]; the returned summary records local
    /// source paths. On failure the session disconnects before the error
    /// is returned.
    ///
    /// [`download`]: RemoteTransferSession::download
    pub async fn upload(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        options: TransferOptions,
    ) -> Result<TransferSummary> {
        let uploaded = upload::upload(self, remote_path, local_path, options).await;
        match uploaded {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    /// Deletes remote files recorded by a previous download, one remove per
    /// path. Not transactional: a failure partway leaves earlier paths
    /// deleted.
    pub async fn remove_remote_files(&self, paths: &[String]) -> Result<usize> {
        let sftp = self.sftp()?;
        for path in paths {
            sftp.remove_file(path.as_str()).await.map_err(|e| {
                TransferError::Transfer(format!("failed to remove remote file {path}: {e}"))
            })?;
        }
        Ok(paths.len())
    }

    /// Deletes local files recorded by a previous upload. Not transactional.
    pub async fn remove_local_files(&self, paths: &[String]) -> Result<usize> {
        for path in paths {
            tokio::fs::remove_file(path).await.map_err(|e| {
                TransferError::LocalIo(format!("failed to remove local file {path}: {e}"))
            })?;
        }
        Ok(paths.len())
    }

    /// Whether the remote path is a directory (no-follow stat).
    pub async fn remote_is_dir(&self, path: &str) -> Result<bool> {
        Ok(self.stat_kind(path).await? == RemoteFileKind::Directory)
    }

    /// Whether the remote path is a regular file (no-follow stat).
    pub async fn remote_is_file(&self, path: &str) -> Result<bool> {
        Ok(self.stat_kind(path).await? == RemoteFileKind::File)
    }

    /// Whether the remote path is a symlink (no-follow stat).
    pub async fn remote_is_symlink(&self, path: &str) -> Result<bool> {
        Ok(self.stat_kind(path).await? == RemoteFileKind::Symlink)
    }

    /// Classify a remote path with a no-follow stat. No caching; every call
    /// re-queries the transport.
    pub(crate) async fn stat_kind(&self, path: &str) -> Result<RemoteFileKind> {
        let sftp = self.sftp()?;
        let attrs = sftp.symlink_metadata(path).await.map_err(|e| {
            TransferError::InvalidPath(format!("{path} is an invalid path: {e}"))
        })?;
        Ok(RemoteFileKind::from(attrs.file_type()))
    }

    /// Guarded access to the SFTP channel for operation modules.
    pub(crate) fn sftp(&self) -> Result<&SftpSession> {
        match &self.link {
            Some(link) => Ok(&link.sftp),
            None => Err(TransferError::NotConnected),
        }
    }
}

impl std::fmt::Debug for RemoteTransferSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTransferSession")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Auth;

    fn disconnected_session() -> RemoteTransferSession {
        RemoteTransferSession::new(SessionConfig::new(
            "example.invalid",
            "user",
            Auth::Password("pw".into()),
        ))
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_when_never_connected() {
        let mut session = disconnected_session();
        session.disconnect().await;
        session.disconnect().await;
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn listing_while_disconnected_reports_not_connected() {
        let mut session = disconnected_session();
        let err = session.list_directory("/data", true).await.unwrap_err();
        assert!(matches!(err, TransferError::NotConnected));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn download_checks_the_local_directory_first() {
        let mut session = disconnected_session();
        let err = session
            .download(
                "/data",
                Path::new("/definitely/not/a/directory"),
                TransferOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn predicates_while_disconnected_report_not_connected() {
        let session = disconnected_session();
        assert!(matches!(
            session.remote_is_dir("/data").await,
            Err(TransferError::NotConnected)
        ));
        assert!(matches!(
            session.remove_remote_files(&["/data/a.txt".into()]).await,
            Err(TransferError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_failure_leaves_the_session_disconnected() {
        // Nothing listens on this port; the refused connect classifies as a
        // connection-level failure and the session stays disconnected.
        let mut session = RemoteTransferSession::new(
            SessionConfig::new("127.0.0.1", "user", Auth::Password("pw".into())).with_port(1),
        );
        let err = session.connect().await.unwrap_err();
        assert!(matches!(
            err,
            TransferError::Connection(_) | TransferError::Timeout(_)
        ));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn remove_local_files_deletes_each_recorded_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let session = disconnected_session();
        let removed = session
            .remove_local_files(&[
                a.to_string_lossy().into_owned(),
                b.to_string_lossy().into_owned(),
            ])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[tokio::test]
    async fn remove_local_files_stops_at_the_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.txt");
        std::fs::write(&present, b"x").unwrap();
        let missing = dir.path().join("missing.txt");

        let session = disconnected_session();
        let err = session
            .remove_local_files(&[
                missing.to_string_lossy().into_owned(),
                present.to_string_lossy().into_owned(),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::LocalIo(_)));
        // Not transactional: the file after the failure is untouched.
        assert!(present.exists());
    }
}
