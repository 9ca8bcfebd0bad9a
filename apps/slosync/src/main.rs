//! slosync: resumable chunked upload of large objects.

mod config;

use std::path::PathBuf;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use slosync_store::DirStore;
use slosync_upload::{SloUpload, UploadConfig};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "slosync")]
#[command(about = "Upload large files as resumable chunked objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, skipping chunks already stored
    Upload {
        #[command(flatten)]
        target: Target,
        /// Re-upload every chunk
        #[arg(long)]
        overwrite: bool,
        /// Emit the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which chunks of a file still need uploading
    Status {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
struct Target {
    /// Local file to upload
    file: PathBuf,
    /// Destination container
    #[arg(long)]
    container: String,
    /// Object name (defaults to the file name)
    #[arg(long)]
    name: Option<String>,
    /// Chunk size in bytes (defaults to the configured size)
    #[arg(long)]
    chunk_size: Option<u64>,
    /// Store root directory (defaults to the configured root)
    #[arg(long)]
    store: Option<PathBuf>,
}

impl Target {
    fn upload_config(&self, config: &Config, overwrite: bool) -> UploadConfig {
        let mut upload = UploadConfig::new(&self.file, &self.container);
        if let Some(name) = &self.name {
            upload.object_name = name.clone();
        }
        upload.chunk_size = self.chunk_size.unwrap_or(config.chunk_size);
        upload.overwrite = overwrite;
        upload
    }

    fn open_store(&self, config: &Config) -> Result<DirStore> {
        let root = self.store.as_ref().unwrap_or(&config.store_root);
        DirStore::open(root).with_context(|| format!("opening store at {}", root.display()))
    }
}

/// Prints progress lines from the driver until every sender is dropped.
fn spawn_printer() -> (UnboundedSender<String>, JoinHandle<()>) {
    let (tx, mut rx) = unbounded_channel::<String>();
    let handle = std::thread::spawn(move || {
        while let Some(line) = rx.blocking_recv() {
            print!("{line}");
        }
    });
    (tx, handle)
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries progress lines and reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;

    match cli.command {
        Commands::Upload {
            target,
            overwrite,
            json,
        } => {
            let store = target.open_store(&config)?;
            let upload = target.upload_config(&config, overwrite);

            let (tx, printer) = spawn_printer();
            let result = SloUpload::new(&store, tx).run(&upload);
            let _ = printer.join();

            let report = result.with_context(|| format!("uploading {}", upload.source.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}/{}: {} chunks uploaded, {} skipped, {} bytes sent in {:.1}s",
                    report.container,
                    report.object_name,
                    report.chunks_uploaded,
                    report.chunks_skipped,
                    report.bytes_sent,
                    report.elapsed.as_secs_f64()
                );
            }
        }
        Commands::Status { target } => {
            let store = target.open_store(&config)?;
            let upload = target.upload_config(&config, false);

            let (tx, printer) = spawn_printer();
            let result = SloUpload::new(&store, tx).status(&upload);
            let _ = printer.join();

            let inventory = result.with_context(|| format!("checking {}", upload.source.display()))?;
            let pending: Vec<String> = inventory.pending().map(|i| i.to_string()).collect();
            println!(
                "{} of {} chunks stored",
                inventory.present_count(),
                inventory.chunk_count()
            );
            if !pending.is_empty() {
                println!("pending: {}", pending.join(", "));
            }
        }
    }

    Ok(())
}
