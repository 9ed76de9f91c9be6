use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Result, TransferError};
use crate::session::RemoteTransferSession;
use crate::types::{TransferOptions, TransferSummary};
use crate::utils::{RemoteSeparator, is_hidden};

/// Uploads a local file or directory of files into a remote directory.
///
/// The mirror of download: `remote_path` must already be a remote
/// directory, the local side is listed with the local filesystem, and the
/// same filtering rules apply. The local paths of all copied files are
/// recorded in the returned summary; `remove_source` deletes them from the
/// local filesystem afterwards.
///
/// Separator inference differs from download by necessity: the destination
/// file does not exist yet, so it cannot be probed with a stat. Instead the
/// first file's `put` is the probe — tried `/`-joined, retried `\`-joined on
/// failure — and the winner is reused for the rest of the call.
pub(crate) async fn upload(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_path: &Path,
    options: TransferOptions,
) -> Result<TransferSummary> {
    if !session.remote_is_dir(remote_path).await? {
        return Err(TransferError::InvalidPath(format!(
            "remote path {remote_path} must be a directory"
        )));
    }

    let mut summary = TransferSummary::default();

    if local_path.is_dir() {
        upload_directory(session, remote_path, local_path, options, &mut summary).await?;
    } else if local_path.is_file() {
        upload_single(session, remote_path, local_path, &mut summary).await?;
    } else {
        return Err(TransferError::InvalidPath(format!(
            "local path {} must be a directory or a file",
            local_path.display()
        )));
    }

    if options.remove_source {
        session.remove_local_files(&summary.transferred).await?;
        summary.sources_removed = true;
        info!(path = %local_path.display(), "removed uploaded files from local directory");
    }

    Ok(summary)
}

async fn upload_directory(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_path: &Path,
    options: TransferOptions,
    summary: &mut TransferSummary,
) -> Result<()> {
    let mut entries = tokio::fs::read_dir(local_path).await.map_err(|e| {
        TransferError::LocalIo(format!(
            "failed to read local directory {}: {}",
            local_path.display(),
            e
        ))
    })?;

    let mut separator: Option<RemoteSeparator> = None;

    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        TransferError::LocalIo(format!("failed to read directory entry: {e}"))
    })? {
        let name = entry.file_name().to_string_lossy().into_owned();
        // Hidden entries are filtered out of consideration entirely, as in
        // the download listing.
        if !options.copy_hidden && is_hidden(&name) {
            continue;
        }

        let entry_local = entry.path();
        if !should_upload(&entry_local, options.copy_symlinks).await? {
            info!(entry = %name, "skipped");
            summary.skipped.push(name);
            continue;
        }

        separator = Some(
            put_with_separator(session, &entry_local, remote_path, &name, separator).await?,
        );
        summary
            .transferred
            .push(entry_local.to_string_lossy().into_owned());
    }

    info!(
        files = summary.transferred.len(),
        from = %local_path.display(),
        to = remote_path,
        "uploaded files to remote directory"
    );
    Ok(())
}

async fn upload_single(
    session: &RemoteTransferSession,
    remote_path: &str,
    local_path: &Path,
    summary: &mut TransferSummary,
) -> Result<()> {
    let name = local_path
        .file_name()
        .ok_or_else(|| {
            TransferError::InvalidPath(format!(
                "local path {} has no file name",
                local_path.display()
            ))
        })?
        .to_string_lossy()
        .into_owned();

    put_with_separator(session, local_path, remote_path, &name, None).await?;
    summary
        .transferred
        .push(local_path.to_string_lossy().into_owned());

    info!(
        from = %local_path.display(),
        to = remote_path,
        "uploaded file to remote directory"
    );
    Ok(())
}

/// A regular file is always uploaded. A symlink is uploaded only when
/// symlink copying is enabled and it resolves to a regular file;
/// directories and anything else are skipped.
async fn should_upload(local: &Path, copy_symlinks: bool) -> Result<bool> {
    let no_follow = tokio::fs::symlink_metadata(local).await.map_err(|e| {
        TransferError::LocalIo(format!("failed to stat {}: {}", local.display(), e))
    })?;

    if no_follow.file_type().is_symlink() {
        if !copy_symlinks {
            return Ok(false);
        }
        // Follow the link; a dangling target resolves to a skip.
        return Ok(matches!(
            tokio::fs::metadata(local).await,
            Ok(resolved) if resolved.is_file()
        ));
    }

    Ok(no_follow.is_file())
}

/// Upload one file, inferring the remote separator when it is not yet known
/// for this call. The known separator is returned for reuse.
async fn put_with_separator(
    session: &RemoteTransferSession,
    local: &Path,
    remote_dir: &str,
    name: &str,
    separator: Option<RemoteSeparator>,
) -> Result<RemoteSeparator> {
    match separator {
        Some(sep) => {
            put_file(session, local, &sep.join(remote_dir, name)).await?;
            Ok(sep)
        }
        None => {
            let slash_dest = RemoteSeparator::Slash.join(remote_dir, name);
            match put_file(session, local, &slash_dest).await {
                Ok(()) => Ok(RemoteSeparator::Slash),
                Err(_) => {
                    debug!("slash-joined put failed, retrying with backslash separator");
                    let backslash_dest = RemoteSeparator::Backslash.join(remote_dir, name);
                    put_file(session, local, &backslash_dest).await?;
                    Ok(RemoteSeparator::Backslash)
                }
            }
        }
    }
}

/// Copy one local file to a remote destination.
async fn put_file(session: &RemoteTransferSession, local: &Path, remote: &str) -> Result<()> {
    let sftp = session.sftp()?;

    let mut local_file = tokio::fs::File::open(local).await.map_err(|e| {
        TransferError::LocalIo(format!(
            "failed to open local file {}: {}",
            local.display(),
            e
        ))
    })?;

    let mut remote_file = sftp.create(remote).await.map_err(|e| {
        TransferError::Transfer(format!("failed to create remote file {remote}: {e}"))
    })?;

    tokio::io::copy(&mut local_file, &mut remote_file)
        .await
        .map_err(|e| {
            TransferError::Transfer(format!(
                "failed to upload {} to {}: {}",
                local.display(),
                remote,
                e
            ))
        })?;

    // Flush buffered writes through the channel before the handle drops.
    remote_file.shutdown().await.map_err(|e| {
        TransferError::Transfer(format!("failed to finalize remote file {remote}: {e}"))
    })?;

    debug!(local = %local.display(), remote, "uploaded file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_files_are_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"payload").unwrap();

        assert!(tokio_test::block_on(should_upload(&file, true)).unwrap());
        assert!(tokio_test::block_on(should_upload(&file, false)).unwrap());
    }

    #[test]
    fn directories_are_never_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();

        assert!(!tokio_test::block_on(should_upload(&sub, true)).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_policy_controls_symlink_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.txt");
        std::fs::write(&target, b"payload").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        // Links resolving to regular files follow the copy_symlinks flag.
        assert!(tokio_test::block_on(should_upload(&link, true)).unwrap());
        assert!(!tokio_test::block_on(should_upload(&link, false)).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("gone"), &link).unwrap();

        assert!(!tokio_test::block_on(should_upload(&link, true)).unwrap());
    }
}
