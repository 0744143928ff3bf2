//! Batch command - process many receipt images in one run.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use warung_core::ReceiptUpload;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (e.g. "receipts/*.jpg")
    #[arg(required = true)]
    input: String,

    /// Record the sales under this user id
    #[arg(short, long)]
    user: Option<String>,

    /// Stop at the first failed receipt instead of continuing
    #[arg(long)]
    fail_fast: bool,
}

/// Result of processing a single file.
struct ScanOutcome {
    path: PathBuf,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    config.validate()?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|entry| entry.ok())
        .filter(|path| {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "png" | "jpg" | "jpeg" | "webp" | "bmp")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching image files found for pattern: {}", args.input);
    }

    println!("{} Found {} receipts to process", style("ℹ").blue(), files.len());

    let pipeline = super::build_pipeline(&config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} receipts")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let outcome = match scan_one(&pipeline, &path, args.user.as_deref()).await {
            Ok(()) => ScanOutcome { path, error: None },
            Err(err) => {
                if args.fail_fast {
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {err}", path.display());
                }
                warn!(file = %path.display(), %err, "receipt failed");
                ScanOutcome {
                    path,
                    error: Some(err.to_string()),
                }
            }
        };
        outcomes.push(outcome);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    let successful = outcomes.len() - failed.len();

    println!();
    println!(
        "{} Processed {} receipts in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed receipts:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn scan_one(
    pipeline: &warung_core::ReceiptPipeline<warung_core::HttpOcrClient, warung_core::ChatClient>,
    path: &PathBuf,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("receipt")
        .to_string();

    pipeline
        .process(ReceiptUpload::new(bytes, file_name), user)
        .await?;
    Ok(())
}
