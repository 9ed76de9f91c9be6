// demos/basic_usage.rs
// Run with: cargo run --example basic_usage

use std::path::Path;

use sftp_transfer::{Auth, RemoteTransferSession, SessionConfig, TransferOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // 1. Configure the session with exactly one credential kind
    let config = SessionConfig::new(
        "example.com",                       // hostname
        "your_username",                     // SSH username
        Auth::Password("your_password".into()),
    );

    let mut session = RemoteTransferSession::new(config);

    // 2. Connect (SSH handshake + SFTP subsystem, bounded by the timeout)
    session
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Connection failed: {}", e))?;

    println!("✅ Connected to {}", session.host());

    // 3. List files in a remote directory
    println!("\n📂 Listing files in /remote/directory...");
    let names = session.list_directory("/remote/directory", true).await?;
    for name in &names {
        println!("  - {}", name);
    }
    println!("Found {} entries", names.len());

    // 4. Download every regular file in the directory
    println!("\n⬇️  Downloading directory...");
    let summary = session
        .download(
            "/remote/directory",
            Path::new("/local/downloads"),
            TransferOptions::default(),
        )
        .await?;
    println!(
        "✅ Downloaded {} files ({} skipped)",
        summary.files_copied(),
        summary.skipped.len()
    );

    // 5. Upload a single local file into a remote directory
    println!("\n⬆️  Uploading file...");
    let summary = session
        .upload(
            "/remote/incoming",
            Path::new("/local/path/document.pdf"),
            TransferOptions::default(),
        )
        .await?;
    println!("✅ Uploaded {} file(s)", summary.files_copied());

    // 6. Cleanup
    println!("\n🧹 Disconnecting...");
    session.disconnect().await;
    println!("✅ All done!");

    Ok(())
}
