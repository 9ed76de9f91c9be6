// demos/advanced_usage.rs
// Run with: cargo run --example advanced_usage

use std::path::{Path, PathBuf};
use std::time::Duration;

use sftp_transfer::{
    Auth, RemoteTransferSession, SessionConfig, TransferError, TransferOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Example 1: Key authentication with filtered directory download
    example_filtered_download().await?;

    // Example 2: Move semantics (delete sources after upload)
    example_move_upload().await?;

    // Example 3: Deferred cleanup driven by the returned summary
    example_deferred_removal().await?;

    // Example 4: Classified error handling
    example_error_handling().await?;

    Ok(())
}

/// Example 1: Download a directory, skipping dotfiles and symlinks
async fn example_filtered_download() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 1: Filtered Download ===");

    let config = SessionConfig::new(
        "example.com",
        "user",
        Auth::Key {
            path: PathBuf::from("/home/user/.ssh/id_ed25519"),
            passphrase: Some("key passphrase".into()),
        },
    )
    .with_port(2222)
    .with_connect_timeout(Duration::from_secs(10));

    let mut session = RemoteTransferSession::new(config);
    session.connect().await?;

    let summary = session
        .download(
            "/var/log/app",
            Path::new("/tmp/logs"),
            TransferOptions {
                copy_hidden: false,
                copy_symlinks: false,
                remove_source: false,
            },
        )
        .await?;

    println!(
        "✅ Copied {} files, skipped {:?}",
        summary.files_copied(),
        summary.skipped
    );

    session.disconnect().await;
    Ok(())
}

/// Example 2: Upload a directory and delete the local sources afterwards
async fn example_move_upload() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 2: Move Upload ===");

    let config = SessionConfig::new("example.com", "user", Auth::Password("pw".into()));
    let mut session = RemoteTransferSession::new(config);
    session.connect().await?;

    let summary = session
        .upload(
            "/incoming",
            Path::new("/tmp/outbox"),
            TransferOptions {
                remove_source: true,
                ..TransferOptions::default()
            },
        )
        .await?;

    assert!(summary.sources_removed);
    println!("✅ Moved {} files to the remote", summary.files_copied());

    session.disconnect().await;
    Ok(())
}

/// Example 3: Download first, decide later whether to delete the sources
async fn example_deferred_removal() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 3: Deferred Removal ===");

    let config = SessionConfig::new("example.com", "user", Auth::Password("pw".into()));
    let mut session = RemoteTransferSession::new(config);
    session.connect().await?;

    let summary = session
        .download("/data", Path::new("/tmp/out"), TransferOptions::default())
        .await?;

    // The summary is the transfer record: hand it back to remove the
    // remote sources once the local copies are verified.
    let removed = session.remove_remote_files(&summary.transferred).await?;
    println!("✅ Removed {} remote files after download", removed);

    session.disconnect().await;
    Ok(())
}

/// Example 4: React to the error classification
async fn example_error_handling() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Example 4: Error Handling ===");

    let config = SessionConfig::new("unreachable.example.com", "user", Auth::Password("pw".into()))
        .with_connect_timeout(Duration::from_secs(3));
    let mut session = RemoteTransferSession::new(config);

    match session.connect().await {
        Ok(()) => {
            println!("connected unexpectedly");
            session.disconnect().await;
        }
        Err(TransferError::Timeout(after)) => {
            println!("❌ Connection timed out after {:?}", after)
        }
        Err(TransferError::AuthenticationFailed(reason)) => {
            println!("❌ Check credentials: {}", reason)
        }
        Err(TransferError::Protocol(reason)) => println!("❌ SSH protocol failure: {}", reason),
        Err(other) => println!("❌ Connection failed: {}", other),
    }

    // A failed transfer disconnects the session; callers observe it here
    // rather than through a stale handle.
    assert!(!session.is_connected());
    Ok(())
}
