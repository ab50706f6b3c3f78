//! Extract command - extract fields from a single invoice text.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use etims_core::{
    ExtractionEngine, ExtractionResult, FieldError, FieldId, InvoiceExtractor,
    ReconciledInvoiceFields, UserValues, reconcile,
};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// JSON file of user-supplied field values that override extraction
    #[arg(short, long)]
    user_values: Option<PathBuf>,

    /// Include the raw text in the output
    #[arg(long)]
    raw_text: bool,

    /// Show per-field confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

/// What a run produced: raw extraction, or extraction merged with user values.
pub enum Outcome {
    Extracted(ExtractionResult),
    Reconciled(ReconciledInvoiceFields),
}

impl Outcome {
    pub fn value(&self, field: FieldId) -> Option<String> {
        match self {
            Self::Extracted(result) => result.value(field).map(|v| v.canonical()),
            Self::Reconciled(fields) => fields.get(field).map(str::to_string),
        }
    }

    pub fn success(&self) -> bool {
        match self {
            Self::Extracted(result) => result.extraction_success,
            Self::Reconciled(fields) => fields.extraction_success,
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Extracted(result) => &result.extraction_errors,
            Self::Reconciled(fields) => &fields.extraction_errors,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = super::load_config(config_path)?;
    if args.raw_text {
        config.extraction.include_raw_text = true;
    }
    let review_threshold = config.extraction.review_threshold;

    let text = read_input(&args.input)?;
    let user_values = args
        .user_values
        .as_deref()
        .map(load_user_values)
        .transpose()?;

    info!("Extracting fields from {}", args.input.display());

    let engine = ExtractionEngine::new(config);
    let result = engine.extract(&text)?;

    // Keep the extraction result for the confidence report
    let outcome = match &user_values {
        Some(values) => Outcome::Reconciled(reconcile(&result, values)),
        None => Outcome::Extracted(result.clone()),
    };

    let output = format_outcome(&outcome, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        print_confidence(&result, review_threshold);
    }

    if !outcome.success() {
        eprintln!(
            "{} Extraction incomplete: {}",
            style("!").yellow(),
            describe_errors(outcome.errors())
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(fs::read_to_string(input)?)
}

/// Load a JSON object of wire field names to values.
pub fn load_user_values(path: &Path) -> anyhow::Result<UserValues> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Invalid user values in {}: {}", path.display(), e)
    })
}

fn print_confidence(result: &ExtractionResult, review_threshold: f32) {
    println!("{} Extraction confidence:", style("ℹ").blue());

    for field in FieldId::ALL {
        let confidence = result.confidence(field);
        let line = format!("  {:<20} {:>5.1}%", field.wire_name(), confidence * 100.0);

        match result.get(field) {
            None => println!("{}", style(line).dim()),
            Some(c) if c.confidence < review_threshold => {
                println!("{} {}", style(line).yellow(), style("(review)").yellow())
            }
            Some(c) if c.correction_applied() => {
                println!("{} {}", line, style("(corrected)").cyan())
            }
            Some(_) => println!("{}", line),
        }
    }
}

pub fn describe_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => match outcome {
            Outcome::Extracted(result) => Ok(serde_json::to_string_pretty(&result.to_record())?),
            Outcome::Reconciled(fields) => Ok(serde_json::to_string_pretty(fields)?),
        },
        OutputFormat::Csv => format_csv(outcome),
        OutputFormat::Text => Ok(format_text(outcome)),
    }
}

fn format_csv(outcome: &Outcome) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    let mut header: Vec<&str> = FieldId::ALL.iter().map(|f| f.wire_name()).collect();
    header.extend(["extraction_success", "extraction_errors"]);
    wtr.write_record(&header)?;

    // Write data
    let mut row: Vec<String> = FieldId::ALL
        .iter()
        .map(|f| outcome.value(*f).unwrap_or_default())
        .collect();
    row.push(outcome.success().to_string());
    row.push(
        outcome
            .errors()
            .iter()
            .map(|e| format!("{}:{}", e.field, e.reason))
            .collect::<Vec<_>>()
            .join(";"),
    );
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcome: &Outcome) -> String {
    let mut output = String::new();

    let show = |output: &mut String, label: &str, field: FieldId| {
        let value = outcome.value(field).unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("{:<16}{}\n", label, value));
    };

    show(&mut output, "Invoice:", FieldId::InvoiceNumber);
    show(&mut output, "Amount:", FieldId::Amount);
    show(&mut output, "Date:", FieldId::InvoiceDate);
    show(&mut output, "Due:", FieldId::DueDate);
    output.push('\n');

    output.push_str("Seller:\n");
    show(&mut output, "  Name:", FieldId::SellerName);
    show(&mut output, "  KRA PIN:", FieldId::SupplierTaxId);
    output.push('\n');

    output.push_str("Buyer:\n");
    show(&mut output, "  Name:", FieldId::BuyerName);
    show(&mut output, "  KRA PIN:", FieldId::BuyerTaxId);
    output.push('\n');

    if outcome.success() {
        output.push_str("Status: complete\n");
    } else {
        output.push_str(&format!(
            "Status: incomplete ({})\n",
            describe_errors(outcome.errors())
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> Outcome {
        let engine = ExtractionEngine::default();
        Outcome::Extracted(
            engine
                .extract("Invoice No: KRASRN000314580\nPIN: A014019184W\nTotal: KES 60,000.00")
                .unwrap(),
        )
    }

    #[test]
    fn test_csv_has_every_field() {
        let csv = format_outcome(&outcome(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("invoice_number,invoice_amount,invoice_date"));
        assert!(header.ends_with("extraction_success,extraction_errors"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("KRASRN000314580,60000.00,,"));
        assert!(row.contains("A014019184W"));
    }

    #[test]
    fn test_text_summary() {
        let text = format_outcome(&outcome(), OutputFormat::Text).unwrap();
        assert!(text.contains("KRASRN000314580"));
        assert!(text.contains("60000.00"));
        assert!(text.contains("Status: complete"));
    }

    #[test]
    fn test_reconciled_json() {
        let mut values = UserValues::new();
        values.insert(FieldId::DueDate, "2026-02-14".to_string());
        let Outcome::Extracted(result) = outcome() else {
            unreachable!()
        };

        let json = format_outcome(
            &Outcome::Reconciled(reconcile(&result, &values)),
            OutputFormat::Json,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["values"]["due_date"], "2026-02-14");
        assert_eq!(value["extraction_success"], true);
    }
}
