use tracing::debug;

use crate::error::{Result, TransferError};
use crate::session::RemoteTransferSession;
use crate::utils::is_hidden;

/// Lists entry names at `remote_path`, one level deep.
///
/// With `show_hidden` false, dotfiles are filtered out of the result. A
/// listing failure classifies as an invalid path; the session facade tears
/// the connection down before returning it.
pub(crate) async fn list_directory(
    session: &RemoteTransferSession,
    remote_path: &str,
    show_hidden: bool,
) -> Result<Vec<String>> {
    let sftp = session.sftp()?;

    let entries = sftp.read_dir(remote_path).await.map_err(|e| {
        TransferError::InvalidPath(format!("{remote_path} is an invalid directory path: {e}"))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        names.push(entry.file_name());
    }
    if !show_hidden {
        names.retain(|name| !is_hidden(name));
    }

    debug!(path = remote_path, count = names.len(), "listed remote directory");
    Ok(names)
}
