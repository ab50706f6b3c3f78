//! Batch processing command for multiple invoice text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use etims_core::{ExtractionEngine, FieldId, InvoiceExtractor, UserValues, reconcile};

use super::extract::{Outcome, OutputFormat, describe_errors, format_outcome, load_user_values};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// JSON file of user-supplied field values applied to every file
    #[arg(short, long)]
    user_values: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (default: available CPU cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Option<Outcome>,
    review: Vec<FieldId>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match &self.outcome {
            Some(outcome) if outcome.success() => "success",
            Some(_) => "incomplete",
            None => "error",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = super::load_config(config_path)?;
    let review_threshold = config.extraction.review_threshold;

    let user_values = args
        .user_values
        .as_deref()
        .map(load_user_values)
        .transpose()?
        .map(Arc::new);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let jobs = args
        .jobs
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
        .max(1);

    println!(
        "{} Found {} files to process with {} workers",
        style("ℹ").blue(),
        files.len(),
        jobs
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One blocking task per document, at most `jobs` running at once
    let engine = Arc::new(ExtractionEngine::new(config));
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let engine = Arc::clone(&engine);
        let semaphore = Arc::clone(&semaphore);
        let user_values = user_values.clone();
        let progress = progress.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let result = process_single_file(path, &engine, user_values.as_deref(), review_threshold);
                progress.inc(1);
                result
            })
            .await?;
            anyhow::Ok(result)
        }));
    }

    let results = collect_in_order(handles, args.continue_on_error, &progress).await?;

    progress.finish_with_message("Complete");

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(outcome) = &result.outcome {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");

                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_outcome(outcome, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |status: &str| results.iter().filter(|r| r.status() == status).count();

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} incomplete, {} failed",
        style(count("success")).green(),
        style(count("incomplete")).yellow(),
        style(count("error")).red()
    );

    let unsuccessful: Vec<_> = results.iter().filter(|r| r.status() != "success").collect();
    if !unsuccessful.is_empty() {
        println!();
        println!("{}", style("Files needing attention:").red());
        for result in unsuccessful {
            let reason = match (&result.outcome, &result.error) {
                (Some(outcome), _) => describe_errors(outcome.errors()),
                (None, Some(error)) => error.clone(),
                (None, None) => "unknown error".to_string(),
            };
            println!("  - {}: {}", result.path.display(), reason);
        }
    }

    Ok(())
}

/// Await per-file tasks in input order.
///
/// Without `continue_on_error` the first failure aborts every task still
/// pending.
async fn collect_in_order(
    handles: Vec<JoinHandle<anyhow::Result<ProcessResult>>>,
    continue_on_error: bool,
    progress: &ProgressBar,
) -> anyhow::Result<Vec<ProcessResult>> {
    let mut results = Vec::with_capacity(handles.len());
    let mut handles = handles.into_iter();

    while let Some(handle) = handles.next() {
        let result = match handle.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                handles.for_each(|h| h.abort());
                return Err(e);
            }
            Err(e) => {
                handles.for_each(|h| h.abort());
                return Err(e.into());
            }
        };

        if let Some(error_msg) = &result.error {
            if continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                handles.for_each(|h| h.abort());
                progress.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(result);
    }

    Ok(results)
}

fn process_single_file(
    path: PathBuf,
    engine: &ExtractionEngine,
    user_values: Option<&UserValues>,
    review_threshold: f32,
) -> ProcessResult {
    let start = Instant::now();

    let extracted = fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|text| Ok(engine.extract(&text)?));

    let processing_time_ms = start.elapsed().as_millis() as u64;

    match extracted {
        Ok(result) => {
            let review = result.low_confidence_fields(review_threshold);
            let outcome = match user_values {
                Some(values) => Outcome::Reconciled(reconcile(&result, values)),
                None => Outcome::Extracted(result),
            };
            ProcessResult {
                path,
                outcome: Some(outcome),
                review,
                error: None,
                processing_time_ms,
            }
        }
        Err(e) => ProcessResult {
            path,
            outcome: None,
            review: Vec::new(),
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "invoice_amount",
        "invoice_date",
        "supplier_kra_pin",
        "buyer_kra_pin",
        "review_fields",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let value = |field: FieldId| {
            result
                .outcome
                .as_ref()
                .and_then(|o| o.value(field))
                .unwrap_or_default()
        };

        let review = result
            .review
            .iter()
            .map(|f| f.wire_name())
            .collect::<Vec<_>>()
            .join(";");

        let error = match (&result.outcome, &result.error) {
            (_, Some(error)) => error.clone(),
            (Some(outcome), None) => describe_errors(outcome.errors()),
            (None, None) => String::new(),
        };

        wtr.write_record([
            filename,
            result.status(),
            &value(FieldId::InvoiceNumber),
            &value(FieldId::Amount),
            &value(FieldId::InvoiceDate),
            &value(FieldId::SupplierTaxId),
            &value(FieldId::BuyerTaxId),
            &review,
            &result.processing_time_ms.to_string(),
            &error,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
