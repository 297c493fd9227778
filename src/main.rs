// Command line front end: reads a passport photo (or OCR text) and prints the MRZ record.

use clap::Parser;
use log::info;
use mrzscan::{
    config::CheckDigitPolicy,
    models::{PassportRecord, RawImage},
    processing::{OcrEngine, PrecomputedOcr},
    PassportError, PassportReader, PipelineConfig, ScanOutcome, ScanSession,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "mrzscan", version, about = "Read the machine readable zone of a passport")]
struct Cli {
    /// Passport image (PNG, JPEG, ...)
    image: Option<PathBuf>,

    /// Use OCR text from this file instead of running an OCR engine
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,

    /// Confidence (0-100) to report for --text input
    #[arg(long, default_value_t = 100.0)]
    confidence: f32,

    /// JSON pipeline configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the minimum OCR confidence
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Accept MRZs with failed check digits and flag those fields as invalid.
    ///
    /// By default any wrong check digit (a mistyped composite digit, for
    /// instance) rejects the scan with "Invalid MRZ".
    #[arg(long)]
    lenient: bool,

    /// Print the record as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, PassportError> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(min_confidence) = cli.min_confidence {
        config.min_confidence = min_confidence;
    }
    if cli.lenient {
        config.check_digits = CheckDigitPolicy::Lenient;
    }
    config.validate()?;
    Ok(config)
}

fn build_engine(cli: &Cli) -> Result<Arc<dyn OcrEngine>, PassportError> {
    if let Some(path) = &cli.text {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PassportError::Unexpected(format!("Failed to read {}: {}", path.display(), e))
        })?;
        return Ok(Arc::new(PrecomputedOcr::new(text, cli.confidence)));
    }

    default_engine()
}

#[cfg(feature = "tesseract")]
fn default_engine() -> Result<Arc<dyn OcrEngine>, PassportError> {
    Ok(Arc::new(mrzscan::processing::TesseractEngine::new()))
}

#[cfg(not(feature = "tesseract"))]
fn default_engine() -> Result<Arc<dyn OcrEngine>, PassportError> {
    Err(PassportError::Unexpected(
        "built without the `tesseract` feature; pass --text with OCR output".to_string(),
    ))
}

async fn run(cli: &Cli) -> Result<ScanOutcome, PassportError> {
    let config = load_config(cli)?;
    let engine = build_engine(cli)?;
    let reader = PassportReader::new(config, engine);

    let image = match &cli.image {
        Some(path) => reader.load_image(path)?,
        // Precomputed text needs no pixels.
        None if cli.text.is_some() => RawImage::new(1, 1, vec![255; 4])?,
        None => {
            return Err(PassportError::Unexpected(
                "an image path or --text is required".to_string(),
            ))
        }
    };

    let mut session = ScanSession::new(reader);
    let mut states = session.subscribe();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            info!("{}", state);
        }
    });

    session.scan(image).await
}

fn print_report(record: &PassportRecord) {
    println!("\n===============================================");
    println!("            PASSPORT MRZ REPORT");
    println!("===============================================\n");

    let width = record
        .fields
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    for field in &record.fields {
        println!("  {:<width$}  {}", field.label, field.value, width = width);
    }

    println!("\nMACHINE READABLE ZONE:");
    for line in &record.mrz_lines {
        println!("  {}", line);
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(ScanOutcome::Completed(record)) => {
            if cli.json {
                match serde_json::to_string_pretty(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize record: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_report(&record);
            }
        }
        Ok(ScanOutcome::Cancelled) => {
            eprintln!("Scan cancelled");
        }
        Err(err) => {
            eprintln!("Error reading passport: {}", err);
            std::process::exit(1);
        }
    }
}
