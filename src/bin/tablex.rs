//! Tablex CLI - table extraction from the terminal
//!
//! Extracts tables from a PDF and writes them as HTML, CSV, Markdown, or
//! JSON files, with optional SVG debug overlays.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tablex::export::{table_to_csv, table_to_html, table_to_markdown, table_to_records};
use tablex::{DetectorRef, ExtractOptions, MatrixFill, StitchAggressiveness, parse_page_ranges};

#[derive(Parser)]
#[command(
    name = "tablex",
    version,
    about = "Structured table extraction from PDF documents",
    long_about = "Tablex recovers tables (rows, columns, merged spans, cell text) from the\n\
                  positioned glyphs and vector rulings of a PDF, and exports them as HTML,\n\
                  CSV, Markdown, or JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tables from a PDF
    Extract {
        /// Input file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Comma-separated page ranges, e.g. 1,3-5
        #[arg(short, long)]
        pages: Option<String>,

        /// Detector name
        #[arg(short, long, default_value = "plumber")]
        detector: String,

        /// Export format
        #[arg(short = 't', long = "to", value_enum, default_value = "html")]
        format: ExportFormatArg,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Fill policy for matrix-based formats
        #[arg(long, value_enum, default_value = "repeat")]
        fill_policy: FillPolicyArg,

        /// Sentinel text written at merged positions with the sentinel policy
        #[arg(long, default_value = "<MERGED>")]
        sentinel: String,

        /// Stitching aggressiveness
        #[arg(long, value_enum, default_value = "med")]
        stitch_aggressiveness: StitchArg,

        /// Emit inline styles in HTML output
        #[arg(long)]
        inline_styles: bool,

        /// Write an SVG debug overlay next to each table
        #[arg(long)]
        debug_overlays: bool,
    },

    /// Run extraction repeatedly and report timings
    Bench {
        /// Input file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        repeat: usize,

        /// Detector name
        #[arg(short, long, default_value = "plumber")]
        detector: String,
    },

    /// List registered detectors
    Detectors,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormatArg {
    /// HTML table with rowspan/colspan
    Html,
    /// CSV over the matrix projection
    Csv,
    /// Markdown pipe table
    Md,
    /// JSON array of rows
    Json,
}

impl ExportFormatArg {
    fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Md => "md",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FillPolicyArg {
    /// Repeat the cell text across its span
    Repeat,
    /// Leave covered positions blank
    Empty,
    /// Write a sentinel at covered positions
    Sentinel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StitchArg {
    /// Join only near-identical widths
    Low,
    /// Balanced default
    Med,
    /// Permit larger width drift
    High,
}

impl From<StitchArg> for StitchAggressiveness {
    fn from(arg: StitchArg) -> Self {
        match arg {
            StitchArg::Low => Self::Low,
            StitchArg::Med => Self::Med,
            StitchArg::High => Self::High,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if let Err(e) = run_command(cli) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract {
            input,
            pages,
            detector,
            format,
            out,
            fill_policy,
            sentinel,
            stitch_aggressiveness,
            inline_styles,
            debug_overlays,
        } => {
            let fill = match fill_policy {
                FillPolicyArg::Repeat => MatrixFill::Repeat,
                FillPolicyArg::Empty => MatrixFill::Empty,
                FillPolicyArg::Sentinel => MatrixFill::Sentinel(sentinel.clone()),
            };
            let options = ExtractOptions {
                pages: pages.as_deref().map(parse_page_ranges).transpose()?,
                detector: DetectorRef::Named(detector.clone()),
                stitch: stitch_aggressiveness.into(),
            };

            if !cli.quiet {
                println!("{}", "Extracting tables...".cyan().bold());
                println!("  Input:    {}", input.display());
                println!("  Detector: {detector}");
            }

            let start = Instant::now();
            let result = tablex::extract(&input, &options)?;
            let duration = start.elapsed();

            std::fs::create_dir_all(&out)
                .with_context(|| format!("creating output directory {}", out.display()))?;
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");

            for (idx, table) in result.tables.iter().enumerate() {
                let base = format!("{}_table_{}", stem, idx + 1);
                let rendered = match format {
                    ExportFormatArg::Html => table_to_html(table, inline_styles),
                    ExportFormatArg::Csv => table_to_csv(table, &fill),
                    ExportFormatArg::Md => table_to_markdown(table, &fill),
                    ExportFormatArg::Json => table_to_records(table, &fill)?,
                };
                let path = out.join(format!("{base}.{}", format.extension()));
                std::fs::write(&path, rendered)
                    .with_context(|| format!("writing {}", path.display()))?;

                if debug_overlays {
                    let epsilon = table
                        .meta
                        .get("epsilon")
                        .and_then(serde_json::Value::as_f64)
                        .unwrap_or(0.0);
                    let overlay =
                        tablex::overlay::render_overlay(table, epsilon, &detector, 1.0);
                    let overlay_path = out.join(format!("{base}_overlay.html"));
                    std::fs::write(&overlay_path, overlay)
                        .with_context(|| format!("writing {}", overlay_path.display()))?;
                }
            }

            if !cli.quiet {
                println!();
                println!(
                    "{}",
                    format!("✓ Extracted {} tables.", result.tables.len())
                        .green()
                        .bold()
                );
                println!();
                println!("{}", "Statistics:".yellow().bold());
                println!("  Duration: {duration:?}");
                println!("  Regions:  {}", result.stats.regions);
                println!("  Tables:   {}", result.stats.tables);
                for warning in &result.warnings {
                    println!("  {} {warning}", "Warning:".yellow());
                }
            }
            Ok(())
        }

        Commands::Bench {
            input,
            repeat,
            detector,
        } => {
            let options = ExtractOptions {
                detector: DetectorRef::Named(detector),
                ..Default::default()
            };
            println!("{}", "Tablex Benchmark".cyan().bold());
            let mut times = Vec::with_capacity(repeat);
            let mut tables = 0;
            for run in 1..=repeat {
                let start = Instant::now();
                let result = tablex::extract(&input, &options)?;
                let elapsed = start.elapsed();
                tables = result.tables.len();
                println!("  run {run}: {:.3}s", elapsed.as_secs_f64());
                times.push(elapsed.as_secs_f64());
            }
            let avg = times.iter().sum::<f64>() / times.len().max(1) as f64;
            println!("  avg:   {avg:.3}s");
            println!("  tables: {tables}");
            Ok(())
        }

        Commands::Detectors => {
            println!("{}", "Registered detectors".cyan().bold());
            for name in tablex::detect::available_detectors() {
                println!("  {name}");
            }
            Ok(())
        }
    }
}
