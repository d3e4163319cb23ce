//! CLI entry point for the listings ETL.

use airbnb_rio_etl::{Pipeline, PipelineConfig, PipelineResult, format_thousands};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Rio de Janeiro Airbnb listings ETL",
    long_about = "Joins listings_cleaned.csv and reviews.csv, cleans and normalizes the\n\
                  listing attributes and writes modeling-ready artifacts.\n\n\
                  Running without arguments reads from the current directory and writes\n\
                  to ./airbnb_rio_outputs.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG    Log filter, overrides --log-level"
)]
struct Args {
    /// Directory containing listings_cleaned.csv and reviews.csv
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,

    /// Output directory for the artifacts
    #[arg(long, default_value = "airbnb_rio_outputs")]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Skip rendering the price box plots
    #[arg(long)]
    no_plots: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let config = PipelineConfig::builder()
        .input_dir(&args.input_dir)
        .output_dir(&args.output_dir)
        .write_plots(!args.no_plots)
        .build()
        .context("Invalid configuration")?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting listings ETL...");
    info!("{}", "=".repeat(80));

    match pipeline.run() {
        Ok(result) => {
            print_human_readable_summary(&result, &args);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e).context("Pipeline failed")
        }
    }
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(result: &PipelineResult, args: &Args) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("ETL COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} listings, {} reviews)",
        args.input_dir.display(),
        format_thousands(summary.listings_rows),
        format_thousands(summary.reviews_rows)
    );
    println!("Output: {}", args.output_dir.display());
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Joined rows: {}", format_thousands(summary.joined_rows));
    println!(
        "  Cleaned table: {} rows x {} columns",
        format_thousands(summary.cleaned_rows),
        summary.cleaned_columns
    );
    println!(
        "  Model table: {} rows x {} columns",
        format_thousands(summary.model_rows),
        summary.model_columns.len()
    );
    if let Some(outliers) = &summary.outliers {
        println!(
            "  Outliers: {} rows outside [{:.2}, {:.2}] ({:.1}%)",
            format_thousands(outliers.rows_removed()),
            outliers.bounds.lower,
            outliers.bounds.upper,
            summary.outlier_percentage()
        );
    }
    println!();

    if !summary.actions.is_empty() {
        println!("Actions Taken:");
        for action in &summary.actions {
            println!(
                "  - [{}] {}: {}",
                action.action_type.display_name(),
                action.target,
                action.description
            );
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("{}", "=".repeat(80));
}
