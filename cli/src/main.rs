//! pdfdiff CLI - report text a newer PDF adds over an older one

mod display;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use regex::Regex;

use pdfdiff::report::{self, EXPORT_FILE_NAME};
use pdfdiff::{
    Comparator, ComparisonStatus, DiffOptions, EngineRegistry, ErrorMode, ExtractOptions,
    JsonFormat, TextExtractor,
};

use display::ComparisonDisplay;

#[derive(Parser)]
#[command(name = "pdfdiff")]
#[command(version)]
#[command(about = "Report text a newer PDF adds over an older one", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the latest PDF against an outdated one
    #[command(alias = "diff")]
    Compare {
        /// The newer PDF
        #[arg(value_name = "LATEST")]
        latest: PathBuf,

        /// The older PDF
        #[arg(value_name = "OUTDATED")]
        outdated: PathBuf,

        /// Output file or directory (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Similarity at or above which two lines count as the same (0.0-1.0)
        #[arg(long, env = "PDFDIFF_THRESHOLD", default_value_t = pdfdiff::options::DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,

        /// Drop lines matching this regex before comparing (repeatable)
        #[arg(long, value_name = "REGEX")]
        ignore: Vec<String>,

        /// Apply NFKC compatibility folding to lines
        #[arg(long)]
        nfkc: bool,

        /// Extract pages one at a time
        #[arg(long)]
        sequential: bool,

        /// Treat unreadable pages as empty instead of failing
        #[arg(long)]
        lenient: bool,

        /// Decode engine
        #[arg(long, default_value = "lopdf")]
        engine: String,

        /// Hide progress bars
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the per-page text of a PDF as the comparison sees it
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output JSON instead of plain text
        #[arg(long)]
        json: bool,

        /// Treat unreadable pages as empty instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Plain-text export
    Text,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
}

struct CompareArgs {
    latest: PathBuf,
    outdated: PathBuf,
    output: Option<PathBuf>,
    format: ReportFormat,
    threshold: f64,
    ignore: Vec<String>,
    nfkc: bool,
    sequential: bool,
    lenient: bool,
    engine: String,
    quiet: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            latest,
            outdated,
            output,
            format,
            threshold,
            ignore,
            nfkc,
            sequential,
            lenient,
            engine,
            quiet,
        } => cmd_compare(CompareArgs {
            latest,
            outdated,
            output,
            format,
            threshold,
            ignore,
            nfkc,
            sequential,
            lenient,
            engine,
            quiet,
        }),
        Commands::Extract {
            input,
            output,
            json,
            lenient,
        } => cmd_extract(&input, output.as_deref(), json, lenient),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn extract_options(sequential: bool, lenient: bool) -> ExtractOptions {
    let mode = if lenient {
        ErrorMode::Lenient
    } else {
        ErrorMode::Strict
    };
    ExtractOptions::new()
        .with_error_mode(mode)
        .with_parallel(!sequential)
}

fn diff_options(args: &CompareArgs) -> Result<DiffOptions, Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(format!("Threshold must be between 0 and 1, got {}", args.threshold).into());
    }

    let mut options = DiffOptions::new()
        .with_similarity_threshold(args.threshold)
        .with_unicode_normalization(args.nfkc);
    for pattern in &args.ignore {
        let re = Regex::new(pattern).map_err(|e| format!("Invalid --ignore pattern: {}", e))?;
        options = options.with_ignore_pattern(re);
    }
    Ok(options)
}

/// Resolve `-o`: a directory gets the default export file name.
fn output_path(output: &Path, format: ReportFormat) -> PathBuf {
    if !output.is_dir() {
        return output.to_path_buf();
    }
    match format {
        ReportFormat::Text => output.join(EXPORT_FILE_NAME),
        ReportFormat::Json | ReportFormat::JsonCompact => {
            output.join(Path::new(EXPORT_FILE_NAME).with_extension("json"))
        }
    }
}

fn cmd_compare(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let diff_options = diff_options(&args)?;
    let registry = EngineRegistry::with_defaults();

    let comparator = registry
        .get(&args.engine)
        .and_then(Comparator::new)
        .map_err(|e| format!("{}\n  {}", e.user_message(), e.to_string().dimmed()))?
        .with_extract_options(extract_options(args.sequential, args.lenient))
        .with_diff_options(diff_options);

    log::debug!(
        "Comparing {} against {} with {}",
        args.latest.display(),
        args.outdated.display(),
        comparator.extractor().engine_name()
    );

    let display = ComparisonDisplay::new(args.quiet);
    display.set_status(ComparisonStatus::Extracting);

    let sink = Arc::clone(&display);
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(comparator.extract_files(
        &args.latest,
        &args.outdated,
        Arc::new(move |role, progress| sink.update(role, progress)),
    ));

    let (latest_text, outdated_text) = match result {
        Ok(texts) => texts,
        Err(e) => {
            display.finish(ComparisonStatus::Failed);
            return Err(format!("{}\n  {}", e.user_message(), e.to_string().dimmed()).into());
        }
    };

    display.set_status(ComparisonStatus::Diffing);
    log::debug!("{}", display.status_line());
    let diff_report = comparator.compare_text(&latest_text, &outdated_text);

    let status = ComparisonStatus::finished(&diff_report);
    display.finish(status);

    let generated_at = chrono::Utc::now();
    let rendered = match args.format {
        ReportFormat::Text => report::to_text(&diff_report.records, generated_at),
        ReportFormat::Json => report::to_json(&diff_report.records, generated_at, JsonFormat::Pretty)?,
        ReportFormat::JsonCompact => {
            report::to_json(&diff_report.records, generated_at, JsonFormat::Compact)?
        }
    };

    if let Some(output) = &args.output {
        let path = output_path(output, args.format);
        fs::write(&path, &rendered)?;
        if !args.quiet {
            println!("{} {}", "Saved to".green(), path.display());
        }
    } else {
        print!("{}", rendered);
    }

    if !args.quiet {
        let headline = match status {
            ComparisonStatus::Ready => status.message().green().bold(),
            _ => status.message().yellow().bold(),
        };
        eprintln!(
            "{} ({} pages compared, {} new lines)",
            headline,
            diff_report.pages_compared,
            diff_report.total_unique_lines()
        );
        if !diff_report.exact_mode_pages.is_empty() {
            eprintln!(
                "{} pages {:?} were too large for fuzzy matching and were compared exactly",
                "Note:".yellow(),
                diff_report.exact_mode_pages
            );
        }
    }

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let extractor = TextExtractor::lopdf().with_options(extract_options(false, lenient));
    let pages = extractor
        .extract(&data, &|_| {})
        .map_err(|e| format!("{}\n  {}", e.user_message(), e.to_string().dimmed()))?;

    let rendered = if json {
        pages.to_json(true)?
    } else {
        pages.plain_text()
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfdiff".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Reports text a newer PDF adds over an older one");
    println!();
    println!(
        "Engines: {}",
        EngineRegistry::with_defaults().names().join(", ")
    );
    println!("License: MIT");
}
