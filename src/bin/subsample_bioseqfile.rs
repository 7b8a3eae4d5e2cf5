use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use riboviz::subsample::*;
use riboviz::utils::init_logger;

/// Randomly subsample a FASTA/FASTQ file, keeping each record with a fixed probability.
#[derive(Parser, Debug)]
#[command(name = "subsample_bioseqfile", version, about)]
struct Cli {
    /// FASTA/FASTQ input, optionally gzipped
    #[arg(short, long)]
    input: PathBuf,

    /// Output file, gzipped if it ends with .gz
    #[arg(short, long)]
    output: PathBuf,

    /// Probability of keeping each record
    #[arg(short, long, default_value_t = DEFAULT_PROBABILITY)]
    probability: f64,

    /// Overwrite the output file if it exists
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Random seed, for reproducible samples
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = SubsampleConfig {
        probability: cli.probability,
        overwrite: cli.overwrite,
        seed: cli.seed,
    };
    if let Err(e) = subsample_bioseqfile(&cli.input, &cli.output, &config) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}
