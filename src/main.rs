use anyhow::Result;
use cbzmerge::{CbzMerger, MergeSummary, OutputMode};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cbzmerge")]
#[command(about = "Merge multiple CBZ files into a single CBZ or PDF file. Extracts all pages \
from the CBZ files in a directory, renumbers them sequentially, preserves double-page naming, \
and creates a merged output file")]
#[command(version = "0.1.0")]
struct Args {
    /// Directory containing CBZ files to concatenate. All CBZ files in this
    /// directory will be unpacked and merged.
    inputdir: PathBuf,

    /// Output file name. This can be a CBZ file (with .cbz extension) or a
    /// PDF file (with .pdf extension).
    output_file: PathBuf,

    /// If specified, the output file will be a PDF instead of a CBZ
    #[arg(long = "pdf")]
    pdf: bool,
}

fn run(args: Args) -> Result<MergeSummary> {
    let mode = if args.pdf {
        OutputMode::Pdf
    } else {
        OutputMode::Cbz
    };

    let merger = CbzMerger::new(args.inputdir, args.output_file, mode);
    Ok(merger.run()?)
}

fn main() {
    let filter = EnvFilter::from_default_env().add_directive("cbzmerge=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(summary) => {
            info!(
                "Merged {} pages into {}",
                summary.page_count,
                summary.output_path.display().to_string().green()
            );
        }
        Err(e) => {
            error!("{}", format!("Error: {}", e).red());
            process::exit(1);
        }
    }
}
