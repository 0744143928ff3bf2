//! Scan command - process a single receipt image.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use warung_core::{OcrProcessResponse, ReceiptUpload};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt image to process
    #[arg(required = true)]
    input: PathBuf,

    /// Record the sale under this user id
    #[arg(short, long)]
    user: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON output
    Json,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let bytes = fs::read(&args.input)?;
    let file_name = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("receipt")
        .to_string();

    debug!(file = %args.input.display(), bytes = bytes.len(), "scanning receipt");

    let pipeline = super::build_pipeline(&config)?;
    let response = pipeline
        .process(ReceiptUpload::new(bytes, file_name), args.user.as_deref())
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print_text(&response),
    }

    Ok(())
}

fn print_text(response: &OcrProcessResponse) {
    println!("{}", style("Receipt recorded").green().bold());
    for item in &response.items {
        println!("  {} x{}  Rp {}", item.name, item.qty, item.price);
    }
    println!();
    println!("  Total:  Rp {}", response.total);
    println!("  Profit: Rp {}", response.profit);

    if let Some(insights) = &response.summary.insights {
        println!();
        println!("{}", style("Insights").cyan().bold());
        println!("  {insights}");
    }
    for suggestion in &response.summary.suggestions {
        println!("  - {suggestion}");
    }
}
