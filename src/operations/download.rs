use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransferError};
use crate::operations::list;
use crate::session::RemoteTransferSession;
use crate::types::{RemoteFileKind, TransferOptions, TransferSummary};
use crate::utils::{RemoteSeparator, remote_basename};

/// Downloads a remote file or directory of files into a local directory.
///
/// `local_path` must already exist as a directory. Directory downloads are
/// one level deep: regular files are copied, symlinks are copied when they
/// resolve to regular files and `copy_symlinks` is set, everything else is
/// skipped and reported. The remote paths of all copied files are recorded
/// in the returned summary; `remove_source` deletes them afterwards.
pub(crate) async fn download(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_path: &Path,
    options: TransferOptions,
) -> Result<TransferSummary> {
    if !local_path.is_dir() {
        return Err(TransferError::InvalidPath(format!(
            "local path {} must be a directory",
            local_path.display()
        )));
    }

    let mut summary = TransferSummary::default();

    if session.remote_is_dir(remote_path).await? {
        download_directory(session, remote_path, local_path, options, &mut summary).await?;
    } else {
        download_single(session, remote_path, local_path, &mut summary).await?;
    }

    if options.remove_source {
        session.remove_remote_files(&summary.transferred).await?;
        summary.sources_removed = true;
        info!(path = remote_path, "removed downloaded files from remote directory");
    }

    Ok(summary)
}

async fn download_directory(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_path: &Path,
    options: TransferOptions,
    summary: &mut TransferSummary,
) -> Result<()> {
    let entries = list::list_directory(session, remote_path, options.copy_hidden).await?;

    // Separator inferred once from the first entry and reused for the
    // whole listing.
    let mut separator: Option<RemoteSeparator> = None;

    for name in entries {
        let sep = match separator {
            Some(sep) => sep,
            None => {
                let sep = detect_separator(session, remote_path, &name).await;
                separator = Some(sep);
                sep
            }
        };

        let entry_remote = sep.join(remote_path, &name);
        let entry_local = local_path.join(&name);

        if should_download(session, &entry_remote, options.copy_symlinks).await? {
            get_file(session, &entry_remote, &entry_local).await?;
            summary.transferred.push(entry_remote);
        } else {
            info!(entry = %name, "skipped");
            summary.skipped.push(name);
        }
    }

    info!(
        files = summary.transferred.len(),
        from = remote_path,
        to = %local_path.display(),
        "downloaded files from remote directory"
    );
    Ok(())
}

async fn download_single(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_dir: &Path,
    summary: &mut TransferSummary,
) -> Result<()> {
    let sftp = session.sftp()?;
    let resolved = sftp.canonicalize(remote_path).await.map_err(|_| {
        TransferError::InvalidPath(format!("remote path {remote_path} must be a valid filepath"))
    })?;

    if session.stat_kind(&resolved).await? != RemoteFileKind::File {
        return Err(TransferError::InvalidPath(format!(
            "remote path {remote_path} must be a file"
        )));
    }

    let dest = local_dir.join(remote_basename(remote_path));
    get_file(session, remote_path, &dest).await?;
    summary.transferred.push(remote_path.to_string());

    info!(
        from = remote_path,
        to = %local_dir.display(),
        "downloaded file from remote directory"
    );
    Ok(())
}

/// Probe the separator with a no-follow stat on the `/`-joined candidate;
/// a failed probe selects `\` for the remainder of the call.
async fn detect_separator(
    session: &RemoteTransferSession,
    base: &str,
    first_entry: &str,
) -> RemoteSeparator {
    let probe = RemoteSeparator::Slash.join(base, first_entry);
    match session.stat_kind(&probe).await {
        Ok(_) => RemoteSeparator::Slash,
        Err(_) => {
            debug!("slash-joined probe failed, using backslash separator");
            RemoteSeparator::Backslash
        }
    }
}

/// A regular file is always copied. A symlink is copied only when symlink
/// copying is enabled and it resolves to a regular file; an entry whose
/// resolution fails is skipped rather than failing the call.
async fn should_download(
    session: &RemoteTransferSession,
    entry_remote: &str,
    copy_symlinks: bool,
) -> Result<bool> {
    match session.stat_kind(entry_remote).await? {
        RemoteFileKind::File => Ok(true),
        RemoteFileKind::Symlink if copy_symlinks => {
            Ok(matches!(resolve_kind(session, entry_remote).await, Ok(RemoteFileKind::File)))
        }
        _ => Ok(false),
    }
}

async fn resolve_kind(session: &RemoteTransferSession, path: &str) -> Result<RemoteFileKind> {
    let sftp = session.sftp()?;
    let target = sftp.canonicalize(path).await.map_err(|e| {
        TransferError::InvalidPath(format!("failed to resolve symlink {path}: {e}"))
    })?;
    session.stat_kind(&target).await
}

/// Copy one remote file to a local destination. Opening the remote path
/// follows symlinks on the server side, so a link that resolves to a
/// regular file transfers its target's contents.
async fn get_file(session: &RemoteTransferSession, remote: &str, local: &Path) -> Result<()> {
    let sftp = session.sftp()?;

    let mut remote_file = sftp.open(remote).await.map_err(|e| {
        TransferError::Transfer(format!("failed to open remote file {remote}: {e}"))
    })?;

    let mut local_file = tokio::fs::File::create(local).await.map_err(|e| {
        TransferError::LocalIo(format!(
            "failed to create local file {}: {}",
            local.display(),
            e
        ))
    })?;

    tokio::io::copy(&mut remote_file, &mut local_file)
        .await
        .map_err(|e| {
            TransferError::Transfer(format!(
                "failed to download {} to {}: {}",
                remote,
                local.display(),
                e
            ))
        })?;

    debug!(remote, local = %local.display(), "downloaded file");
    Ok(())
}
