use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use riboviz::demultiplex::*;
use riboviz::errors::Result;
use riboviz::utils::{delimiter_byte, init_logger};

/// Demultiplex reads into per-sample FASTQ files by the barcodes in their IDs.
#[derive(Parser, Debug)]
#[command(name = "demultiplex_fastq", version, about)]
struct Cli {
    /// Sample sheet with SampleID and TagRead columns
    #[arg(short = 's', long)]
    sample_sheet: PathBuf,

    /// FASTQ file of reads, optionally gzipped
    #[arg(short = '1', long)]
    read1: PathBuf,

    /// FASTQ file of mates, read in step with the reads
    #[arg(short = '2', long)]
    read2: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Mismatches allowed between read and sample barcodes
    #[arg(short, long, default_value_t = 1)]
    mismatches: usize,

    /// Separator of barcodes and UMIs in read IDs
    #[arg(short, long, default_value_t = '_')]
    delimiter: char,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<()> {
    let config = DemultiplexConfig {
        mismatches: cli.mismatches,
        delimiter: delimiter_byte(cli.delimiter, "read ID delimiter")?,
        ..Default::default()
    };

    let summary = demultiplex_fastq(
        &cli.sample_sheet,
        &cli.read1,
        cli.read2.as_deref(),
        &cli.output,
        &config,
    )?;
    for sample in &summary.samples {
        log::info!("{} ({}): {} reads", sample.sample_id, sample.tag_read, sample.num_reads);
    }
    log::info!("{UNASSIGNED_TAG}: {} reads", summary.unassigned);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}
