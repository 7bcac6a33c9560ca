//! dockharden - rewrite Dockerfiles with security hardening applied.

mod batch;
mod input;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dockharden_engine::{
    Hardener, HardenerConfig, ReportDocument, MISSING_INPUT_MESSAGE, PROCESSING_FAILED_MESSAGE,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for empty or whitespace-only input.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "dockharden")]
#[command(author, version, about = "Apply security hardening rules to Dockerfiles")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hardener configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harden a single Dockerfile
    Harden {
        /// Input Dockerfile path, or "-" for stdin
        #[arg(long, short, default_value = "-")]
        input: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Write a JSON change report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the original and hardened Dockerfile together
    Compare {
        /// Input Dockerfile path, or "-" for stdin
        #[arg(long, short, default_value = "-")]
        input: PathBuf,

        /// Render an HTML page instead of plain text
        #[arg(long)]
        html: bool,

        /// Output path (defaults to stdout)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Harden every Dockerfile in a directory
    Batch {
        /// Directory containing Dockerfiles
        #[arg(long)]
        dir: PathBuf,

        /// Output directory for hardened files
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_invalid_input(&e) => {
            eprintln!("{}", MISSING_INPUT_MESSAGE);
            ExitCode::from(EXIT_INVALID_INPUT)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", PROCESSING_FAILED_MESSAGE);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let hardener = load_hardener(cli.config.as_deref())?;

    match cli.command {
        Commands::Harden { input, out, report } => {
            let original = input::read_input(&input)?;
            let hardened = hardener.harden_checked(&original)?;
            info!(
                "Applied {} changes to {}",
                hardened.report.changes.len(),
                input::describe(&input)
            );

            input::write_output(out.as_deref(), &hardened.content)?;

            if let Some(report_path) = report {
                let document = ReportDocument::new(&original, &hardened.content, hardened.report);
                std::fs::write(&report_path, document.to_json()?)
                    .with_context(|| format!("Failed to write report {:?}", report_path))?;
                info!("Report written to {:?}", report_path);
            }
        }

        Commands::Compare { input, html, out } => {
            let original = input::read_input(&input)?;
            let hardened = hardener.harden_checked(&original)?;

            let renderer = render::Renderer::new()?;
            let view = render::ComparisonView::new(&original, &hardened);
            let page = if html {
                renderer.render_html(&view)?
            } else {
                renderer.render_text(&view)?
            };

            input::write_output(out.as_deref(), &page)?;
        }

        Commands::Batch { dir, out } => {
            info!("Hardening Dockerfiles in {:?}", dir);

            let summary = batch::harden_directory(&dir, &out, Arc::new(hardener)).await?;

            println!("Hardened: {}", summary.hardened);
            println!("Skipped:  {}", summary.skipped);
            println!("Failed:   {}", summary.failed);

            if summary.failed > 0 {
                anyhow::bail!("{} Dockerfiles could not be processed", summary.failed);
            }
        }
    }

    Ok(())
}

fn load_hardener(config: Option<&Path>) -> Result<Hardener> {
    let config = match config {
        Some(path) => HardenerConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => HardenerConfig::default(),
    };
    Ok(Hardener::with_config(config))
}

fn is_invalid_input(e: &anyhow::Error) -> bool {
    e.downcast_ref::<dockharden_common::Error>()
        .map(|e| e.is_invalid_input())
        .unwrap_or(false)
}
