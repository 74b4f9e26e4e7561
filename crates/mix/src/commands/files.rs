//! Files command - session file storage.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use mix_client::{CreateSessionRequest, DownloadOptions, FileInfo, MixClient};

use super::{
    Context, banner, cleanup_sessions, failure, field, finished, note, step, success, truncate,
};

/// Arguments for the files command.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Image to upload for the thumbnail step
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Thumbnail box size in pixels
    #[arg(long, default_value_t = 100)]
    pub thumb: u32,
}

/// Run the files command.
pub async fn run(args: FilesArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    banner("Mix - Files Walkthrough");

    let mut created = Vec::new();
    let result = walkthrough(&client, &args, &mut created).await;
    cleanup_sessions(&client, &created).await;
    result?;

    finished("Files");
    Ok(())
}

async fn walkthrough(client: &MixClient, args: &FilesArgs, created: &mut Vec<String>) -> Result<()> {
    step(1, "Creating a session...");
    let session = client
        .sessions()
        .create(CreateSessionRequest::new("Files Walkthrough Session"))
        .await
        .context("Failed to create session")?;
    created.push(session.id.clone());
    success(format!("Created session {}", session.id));
    println!();

    step(2, "Uploading a text file...");
    let text = format!(
        "Hello from the Mix CLI!\nThis is a sample text file.\nCreated at: {}",
        chrono::Utc::now().to_rfc3339()
    );
    let uploaded = client
        .files()
        .upload(&session.id, "sample.txt", text.into_bytes())
        .await
        .context("Failed to upload text file")?;
    print_info(&uploaded);
    println!();

    let mut image_name = None;
    match &args.image {
        Some(path) => {
            step(3, "Uploading an image...");
            match upload_image(client, &session.id, path).await {
                Ok(info) => {
                    print_info(&info);
                    image_name = Some(info.name);
                }
                Err(e) => failure("upload image", e),
            }
        }
        None => {
            step(3, "Skipping image upload");
            note("Pass --image PATH to upload one");
        }
    }
    println!();

    step(4, "Uploading a binary file...");
    let binary: Vec<u8> = (0u8..10).collect();
    match client.files().upload(&session.id, "sample.bin", binary).await {
        Ok(info) => print_info(&info),
        Err(e) => failure("upload binary file", e),
    }
    println!();

    step(5, "Listing files...");
    let files = client
        .files()
        .list(&session.id)
        .await
        .context("Failed to list files")?;
    field("Found:", files.len());
    for (i, file) in files.iter().enumerate() {
        println!("   [{}] {}", i + 1, file.name);
        field("  URL:", &file.url);
        field("  Size:", format!("{} bytes", file.size));
        field("  Modified:", file.modified);
        field("  Directory:", file.is_dir);
    }
    println!();

    if let Some(first) = files.first() {
        step(6, &format!("Downloading {}...", first.name));
        match client
            .files()
            .download(&session.id, &first.name, DownloadOptions::default())
            .await
        {
            Ok(data) => {
                field("Downloaded:", format!("{} bytes", data.len()));
                field("Preview:", preview(&first.name, &data));
            }
            Err(e) => failure("download file", e),
        }
        println!();
    }

    if let Some(name) = &image_name {
        step(7, "Downloading a thumbnail...");
        match client
            .files()
            .download(&session.id, name, DownloadOptions::thumbnail(args.thumb))
            .await
        {
            Ok(data) => {
                field("Thumbnail:", format!("{} bytes", data.len()));
                note(format!("Fitted to a {}px box", args.thumb));
            }
            Err(e) => failure("download thumbnail", e),
        }
        println!();
    }

    step(8, "Verifying file isolation between sessions...");
    let other = client
        .sessions()
        .create(CreateSessionRequest::new("Second Session - File Isolation Test"))
        .await
        .context("Failed to create second session")?;
    created.push(other.id.clone());
    let other_files = client
        .files()
        .list(&other.id)
        .await
        .context("Failed to list files in second session")?;
    field("Files in first session:", files.len());
    field("Files in second session:", other_files.len());
    if other_files.is_empty() {
        success("Sessions have separate file storage");
    } else {
        failure("isolation check", "second session is not empty");
    }
    println!();

    if let Some(first) = files.first() {
        step(9, &format!("Deleting {}...", first.name));
        match client.files().delete(&session.id, &first.name).await {
            Ok(()) => {
                success("File deleted");
                match client.files().list(&session.id).await {
                    Ok(remaining) => field("Remaining:", remaining.len()),
                    Err(e) => failure("verify deletion", e),
                }
            }
            Err(e) => failure("delete file", e),
        }
        println!();
    }

    step(10, "Summary");
    match client.files().list(&session.id).await {
        Ok(files) => {
            let total: u64 = files.iter().map(|f| f.size).sum();
            field("Files:", files.len());
            field(
                "Total size:",
                format!("{} bytes ({:.2} KB)", total, total as f64 / 1024.0),
            );
        }
        Err(e) => failure("final listing", e),
    }

    Ok(())
}

async fn upload_image(client: &MixClient, session_id: &str, path: &PathBuf) -> Result<FileInfo> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(client.files().upload(session_id, name, data).await?)
}

fn print_info(info: &FileInfo) {
    success(format!("Uploaded {}", info.name));
    field("URL:", &info.url);
    field("Size:", format!("{} bytes", info.size));
    field("Modified:", info.modified);
}

/// Text preview for `.txt` files, leading bytes as hex otherwise.
fn preview(name: &str, data: &[u8]) -> String {
    if name.ends_with(".txt") {
        truncate(&String::from_utf8_lossy(data), 100)
    } else {
        data.iter()
            .take(16)
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
    }
}
