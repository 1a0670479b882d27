use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use texture_pow2::batch::{run_batch, Action, BatchSummary};
use texture_pow2::config::BatchConfig;
use texture_pow2::report::write_report;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upscale NPOT textures to the next power of two.
#[derive(Parser, Debug)]
#[command(name = "resize-pow2")]
#[command(version, about = "Classify textures and upscale non-power-of-two ones")]
#[command(long_about = "Classify every texture in INPUT_DIR by whether both sides are powers of two.
Textures that are not get resampled up to the next power of two and written losslessly
to OUTPUT_DIR. Stored alpha is kept as-is (PS2 halved-opacity convention).")]
struct Args {
    /// Directory holding the source textures
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory receiving the rebuilt textures
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Resampling filter
    #[arg(short, long, default_value = "lanczos",
          help = "Resampling filter: nearest, box, bilinear, hamming, bicubic, mitchell, lanczos, kaiser")]
    filter: String,

    /// Descend into sub-directories
    #[arg(short, long)]
    recursive: bool,

    /// Do not copy textures that are already power-of-two sized
    #[arg(long)]
    skip_pow2: bool,

    /// Classify and list NPOT textures without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Keep resampling overshoot in alpha instead of clamping to the source maximum
    #[arg(long)]
    no_alpha_clamp: bool,

    /// Worker threads (defaults to one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Comma-separated texture extensions to pick up
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    ext: Vec<String>,

    /// Write a JSON report of the run
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_FILE_FAILURES: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("texture_pow2={log_level},resize_pow2={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(args) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_FILE_FAILURES),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(args: Args) -> Result<BatchSummary> {
    // Filter first: a bad name must fail before any file is looked at.
    let mut config = BatchConfig::new(args.input_dir, args.output_dir)
        .with_filter_name(&args.filter)?
        .recursive(args.recursive)
        .skip_pow2(args.skip_pow2)
        .dry_run(args.dry_run)
        .clamp_alpha(!args.no_alpha_clamp)
        .jobs(args.jobs)
        .report(args.report);
    if !args.ext.is_empty() {
        config = config.extensions(&args.ext);
    }

    let summary = run_batch(&config).context("batch could not start")?;
    print_summary(&summary, &config);

    if let Some(path) = &config.report {
        write_report(&summary, &config, path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(summary)
}

fn print_summary(summary: &BatchSummary, config: &BatchConfig) {
    if config.dry_run {
        for o in summary.npot() {
            println!("{}\t{} -> {}", o.path.display(), o.source, o.target);
        }
    }

    println!("\n=== resize-pow2 ({}) ===", config.filter);
    println!("NPOT textures:      {}", summary.npot().count());
    println!("Resized:            {}", summary.count(Action::Resized));
    println!("Copied (pow2):      {}", summary.count(Action::PassedThrough));
    println!("Skipped (pow2):     {}", summary.count(Action::Skipped));
    if config.dry_run {
        println!("Planned (dry run):  {}", summary.count(Action::Planned));
    }
    println!("Full-range alpha:   {}", summary.full_range_alpha().count());
    println!("Failed:             {}", summary.failures.len());

    if !summary.failures.is_empty() {
        println!("\nFailures:");
        for f in &summary.failures {
            println!("  {}: {}", f.path.display(), f.error);
        }
    }
}
