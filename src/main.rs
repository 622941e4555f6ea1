//! reflow-pdf - Convert scanned book PDFs into reflowable HTML
//!
//! CLI entry point

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reflow_pdf::{
    exit_codes, CliOverrides, CommandRecognizer, Config, ConsoleProgress, ConversionPipeline,
    DocumentAssembler, OcrError, PageRasterizer, PdfDocument, PdfError, PdfPageSource,
    PipelineOptions,
};

#[derive(Parser)]
#[command(name = "reflow-pdf", version, about = "Convert scanned book PDFs into reflowable HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF into a reflowable HTML document
    Convert(ConvertArgs),
    /// Show version and external backend availability
    Info,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input PDF file
    input: PathBuf,

    /// Output HTML file (defaults to the input name with .html)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document title (defaults to PDF metadata, then the file stem)
    #[arg(long)]
    title: Option<String>,

    /// Raster resolution in DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// OCR backend command
    #[arg(long)]
    ocr_command: Option<String>,

    /// Skip the formula detection pass
    #[arg(long)]
    no_formulas: bool,

    /// Buffer whole pages and write once at the end instead of
    /// streaming
    #[arg(long)]
    batch: bool,

    /// Write a metadata sidecar next to the output
    #[arg(long)]
    metadata: bool,

    /// Config file path (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => run_convert(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    });
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Map well-known failure causes onto dedicated exit codes
fn exit_code_for(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(pdf) = cause.downcast_ref::<PdfError>() {
            return match pdf {
                PdfError::NotFound(_) => exit_codes::INPUT_NOT_FOUND,
                PdfError::RasterizerUnavailable(_) => exit_codes::BACKEND_UNAVAILABLE,
                _ => exit_codes::GENERAL_ERROR,
            };
        }
        if matches!(cause.downcast_ref::<OcrError>(), Some(OcrError::BackendUnavailable(_))) {
            return exit_codes::BACKEND_UNAVAILABLE;
        }
    }
    exit_codes::GENERAL_ERROR
}

// ============ Convert Command ============

fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();

    // Load config file if specified, otherwise use the default path
    let file_config = match &args.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    let config = file_config.merge_with_cli(&cli_overrides(args));

    // Resolve every external collaborator before touching any page,
    // so misconfiguration fails fast.
    let document = PdfDocument::open(&args.input)?;
    let rasterizer = PageRasterizer::resolve(config.dpi)?;
    let recognizer = CommandRecognizer::resolve(&config.ocr_command)?;

    let title = args
        .title
        .clone()
        .or_else(|| document.title())
        .or_else(|| file_stem(&args.input))
        .unwrap_or_else(|| "Untitled document".to_string());

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("html"));

    let source = PdfPageSource::new(document, rasterizer, Box::new(recognizer));

    let assembler = if args.batch || !config.streaming {
        DocumentAssembler::batch(&title, &output)
    } else {
        DocumentAssembler::streaming(&title, &output)
    };

    let pipeline = ConversionPipeline::with_options(
        source,
        assembler,
        PipelineOptions {
            detect_formulas: config.detect_formulas,
            generate_metadata: config.generate_metadata,
        },
    );

    let progress = ConsoleProgress::new();
    let callback: Option<&dyn reflow_pdf::ProgressCallback> =
        if args.quiet { None } else { Some(&progress) };

    let result = pipeline
        .run(callback)
        .with_context(|| format!("converting {}", args.input.display()))?;

    if args.quiet {
        println!("Wrote {}", result.output_path.display());
    }
    println!(
        "  {} pages, {} blocks in {:.2}s",
        result.pages_processed,
        result.total_blocks,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn cli_overrides(args: &ConvertArgs) -> CliOverrides {
    CliOverrides {
        dpi: args.dpi,
        ocr_command: args.ocr_command.clone(),
        detect_formulas: if args.no_formulas { Some(false) } else { None },
        streaming: if args.batch { Some(false) } else { None },
        generate_metadata: if args.metadata { Some(true) } else { None },
    }
}

fn file_stem(path: &std::path::Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("reflow-pdf {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().unwrap_or_default();
    print_backend("rasterizer", PageRasterizer::PROGRAM);
    print_backend("ocr backend", &config.ocr_command);

    if let Some(path) = Config::default_path() {
        let status = if path.exists() { "" } else { " (not present)" };
        println!("  config:      {}{}", path.display(), status);
    }

    Ok(())
}

fn print_backend(label: &str, program: &str) {
    match which::which(program) {
        Ok(path) => println!("  {:<12} {}", format!("{}:", label), path.display()),
        Err(_) => println!("  {:<12} not found ({})", format!("{}:", label), program),
    }
}
